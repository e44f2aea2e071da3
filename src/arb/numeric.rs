//! Fixed-point quantities used by every quote in the engine.
//!
//! `Wad` carries 18 decimals (token amounts), `Ray` carries 27 decimals (rates).
//! Both are signed and backed by an `I256` holding the scaled integer. All
//! arithmetic is checked and division truncates toward zero, which is how the
//! ledger itself rounds. Moving between the two precisions is always explicit.
use std::fmt;
use std::str::FromStr;

use alloy::primitives::{I256, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::NumericError;

/// Number of fractional digits of a `Wad`.
pub const WAD_DECIMALS: u32 = 18;
/// Number of fractional digits of a `Ray`.
pub const RAY_DECIMALS: u32 = 27;

/// `10^exp` as an unsigned 256-bit integer.
fn pow10(exp: u32) -> U256 {
    U256::from(10u128.pow(exp))
}

/// `10^exp` as a signed 256-bit integer.
fn signed_pow10(exp: u32) -> I256 {
    I256::from_raw(pow10(exp))
}

/// `a * b / c`, truncated toward zero, with every step checked.
fn mul_div(a: I256, b: I256, c: I256, op: &'static str) -> Result<I256, NumericError> {
    if c.is_zero() {
        return Err(NumericError::DivisionByZero(op));
    }
    a.checked_mul(b)
        .ok_or(NumericError::Overflow(op))?
        .checked_div(c)
        .ok_or(NumericError::Overflow(op))
}

fn format_scaled(f: &mut fmt::Formatter<'_>, raw: I256, decimals: u32) -> fmt::Result {
    let unit = pow10(decimals);
    let abs = raw.unsigned_abs();
    let sign = if raw.is_negative() { "-" } else { "" };
    write!(
        f,
        "{sign}{}.{:0>width$}",
        abs / unit,
        (abs % unit).to_string(),
        width = decimals as usize
    )
}

fn parse_scaled(input: &str, decimals: u32) -> Result<I256, NumericError> {
    let value = BigDecimal::from_str(input.trim())
        .map_err(|_| NumericError::Parse(input.to_string()))?;
    // Extra fractional digits are dropped, i.e. truncated toward zero
    let (digits, _) = value
        .with_scale(i64::from(decimals))
        .into_bigint_and_exponent();
    I256::from_dec_str(&digits.to_string()).map_err(|_| NumericError::Parse(input.to_string()))
}

/// An 18-decimal fixed-point amount.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wad(I256);

impl Wad {
    /// Zero.
    pub const ZERO: Self = Self(I256::ZERO);

    /// Wraps an already scaled integer (`1` is `0.000000000000000001`).
    #[must_use]
    pub const fn from_raw(raw: I256) -> Self {
        Self(raw)
    }

    /// Whole token units, e.g. `from_number(5)` is `5.0`.
    #[must_use]
    pub fn from_number(units: u64) -> Self {
        // u64::MAX * 10^18 is far below I256::MAX
        Self(I256::from_raw(U256::from(units) * pow10(WAD_DECIMALS)))
    }

    /// The scaled integer.
    #[must_use]
    pub const fn raw(self) -> I256 {
        self.0
    }

    /// `true` when the amount is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// `true` when the amount is strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0.is_positive()
    }

    /// `true` when the amount is strictly negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    /// Checked addition.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the sum is not representable.
    pub fn checked_add(self, other: Self) -> Result<Self, NumericError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(NumericError::Overflow("wad add"))
    }

    /// Checked subtraction.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the difference is not representable.
    pub fn checked_sub(self, other: Self) -> Result<Self, NumericError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(NumericError::Overflow("wad sub"))
    }

    /// Fixed-point product, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the intermediate product overflows.
    pub fn checked_mul(self, other: Self) -> Result<Self, NumericError> {
        mul_div(self.0, other.0, signed_pow10(WAD_DECIMALS), "wad mul").map(Self)
    }

    /// Fixed-point quotient, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` or `NumericError::Overflow`.
    pub fn checked_div(self, other: Self) -> Result<Self, NumericError> {
        mul_div(self.0, signed_pow10(WAD_DECIMALS), other.0, "wad div").map(Self)
    }

    /// `self * numerator / denominator` on the raw integers, truncated once.
    ///
    /// This is how an order book prices a partial fill, so it must not go
    /// through an intermediate rate.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` or `NumericError::Overflow`.
    pub fn mul_div(self, numerator: Self, denominator: Self) -> Result<Self, NumericError> {
        mul_div(self.0, numerator.0, denominator.0, "wad mul_div").map(Self)
    }

    /// Amount scaled by a rate, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the intermediate product overflows.
    pub fn checked_mul_ray(self, rate: Ray) -> Result<Self, NumericError> {
        mul_div(self.0, rate.0, signed_pow10(RAY_DECIMALS), "wad mul ray").map(Self)
    }

    /// Amount divided by a rate, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` or `NumericError::Overflow`.
    pub fn checked_div_ray(self, rate: Ray) -> Result<Self, NumericError> {
        mul_div(self.0, signed_pow10(RAY_DECIMALS), rate.0, "wad div ray").map(Self)
    }

    /// Rescales to 27 decimals. Exact.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the rescaled value is not representable.
    pub fn to_ray(self) -> Result<Ray, NumericError> {
        self.0
            .checked_mul(signed_pow10(RAY_DECIMALS - WAD_DECIMALS))
            .map(Ray)
            .ok_or(NumericError::Overflow("wad to ray"))
    }

    /// The raw value as an unsigned integer, for calldata.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the amount is negative.
    pub fn to_u256(self) -> Result<U256, NumericError> {
        if self.0.is_negative() {
            return Err(NumericError::Overflow("negative wad to u256"));
        }
        Ok(self.0.into_raw())
    }
}

impl Default for Wad {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_scaled(f, self.0, WAD_DECIMALS)
    }
}

impl fmt::Debug for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wad({self})")
    }
}

impl FromStr for Wad {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, WAD_DECIMALS).map(Self)
    }
}

impl TryFrom<String> for Wad {
    type Error = NumericError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Wad> for String {
    fn from(value: Wad) -> Self {
        value.to_string()
    }
}

/// A 27-decimal fixed-point rate. `Ray::ONE` is break-even.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ray(I256);

impl Ray {
    /// Zero.
    pub const ZERO: Self = Self(I256::ZERO);

    /// Wraps an already scaled integer.
    #[must_use]
    pub const fn from_raw(raw: I256) -> Self {
        Self(raw)
    }

    /// Exactly `1.0`.
    #[must_use]
    pub fn one() -> Self {
        Self(signed_pow10(RAY_DECIMALS))
    }

    /// The scaled integer.
    #[must_use]
    pub const fn raw(self) -> I256 {
        self.0
    }

    /// `true` when the rate is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// `numerator / denominator` as a rate, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` or `NumericError::Overflow`.
    pub fn ratio(numerator: Wad, denominator: Wad) -> Result<Self, NumericError> {
        mul_div(numerator.0, signed_pow10(RAY_DECIMALS), denominator.0, "ray ratio").map(Self)
    }

    /// Checked addition.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the sum is not representable.
    pub fn checked_add(self, other: Self) -> Result<Self, NumericError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(NumericError::Overflow("ray add"))
    }

    /// Checked subtraction.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the difference is not representable.
    pub fn checked_sub(self, other: Self) -> Result<Self, NumericError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(NumericError::Overflow("ray sub"))
    }

    /// Fixed-point product, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::Overflow` when the intermediate product overflows.
    pub fn checked_mul(self, other: Self) -> Result<Self, NumericError> {
        mul_div(self.0, other.0, signed_pow10(RAY_DECIMALS), "ray mul").map(Self)
    }

    /// Fixed-point quotient, truncated toward zero.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` or `NumericError::Overflow`.
    pub fn checked_div(self, other: Self) -> Result<Self, NumericError> {
        mul_div(self.0, signed_pow10(RAY_DECIMALS), other.0, "ray div").map(Self)
    }

    /// Rescales to 18 decimals, truncating the extra digits.
    #[must_use]
    pub fn to_wad(self) -> Wad {
        // Division by a non-zero constant cannot overflow for I256 unless
        // dividing MIN by -1, which is not the case here
        Wad(self.0 / signed_pow10(RAY_DECIMALS - WAD_DECIMALS))
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_scaled(f, self.0, RAY_DECIMALS)
    }
}

impl fmt::Debug for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ray({self})")
    }
}

impl FromStr for Ray {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, RAY_DECIMALS).map(Self)
    }
}

impl TryFrom<String> for Ray {
    type Error = NumericError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ray> for String {
    fn from(value: Ray) -> Self {
        value.to_string()
    }
}
