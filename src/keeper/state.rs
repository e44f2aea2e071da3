/// Mutable state of the keeper across blocks.
///
/// Owned by the driver and handed to every block by reference; the engine
/// itself keeps nothing between blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeeperState {
    /// Executions that did not apply so far
    errors: u32,
    /// Set once the error budget is spent; never cleared
    terminated: bool,
}

impl KeeperState {
    /// Fresh state: no errors, running.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: 0,
            terminated: false,
        }
    }

    /// Executions that failed so far.
    #[must_use]
    pub const fn errors(&self) -> u32 {
        self.errors
    }

    /// Whether the keeper has stopped for good.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Counts one failed execution and terminates once `max_errors` is
    /// reached. Returns `true` if this error terminated the keeper.
    pub fn record_error(&mut self, max_errors: u32) -> bool {
        self.errors = self.errors.saturating_add(1);
        self.check_budget(max_errors)
    }

    /// Terminates if the budget is already spent. Returns `true` if the keeper
    /// went from running to terminated.
    pub fn check_budget(&mut self, max_errors: u32) -> bool {
        if !self.terminated && self.errors >= max_errors {
            self.terminated = true;
            return true;
        }
        false
    }
}
