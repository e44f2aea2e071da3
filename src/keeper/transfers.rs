//! Human-readable summaries of the transfers an execution caused.
use alloy::primitives::Address;
use itertools::Itertools;

use super::chain::Transfer;
use crate::arb::{TokenAmount, Wad};
use crate::error::NumericError;

/// Transfers paid by `account`.
pub fn outgoing(transfers: &[Transfer], account: Address) -> Vec<Transfer> {
    transfers
        .iter()
        .filter(|t| t.from == account)
        .copied()
        .collect()
}

/// Transfers received by `account`.
pub fn incoming(transfers: &[Transfer], account: Address) -> Vec<Transfer> {
    transfers
        .iter()
        .filter(|t| t.to == account)
        .copied()
        .collect()
}

/// Per-token balance change of `account`, in order of first appearance.
/// Tokens that net out to zero are left out.
///
/// # Errors
/// `NumericError` on overflow.
pub fn net_movement(transfers: &[Transfer], account: Address) -> Result<Vec<TokenAmount>, NumericError> {
    let mut net = Vec::new();
    for token in transfers.iter().map(|t| t.token).unique() {
        let amount = transfers
            .iter()
            .filter(|t| t.token == token)
            .try_fold(Wad::ZERO, |sum, t| {
                if t.to == account && t.from != account {
                    sum.checked_add(t.value)
                } else if t.from == account && t.to != account {
                    sum.checked_sub(t.value)
                } else {
                    Ok(sum)
                }
            })?;
        if !amount.is_zero() {
            net.push(TokenAmount { token, amount });
        }
    }
    Ok(net)
}

/// `"100.000000000000000000 0x.. and 5.000000000000000000 0x.."`, or
/// `"nothing"`.
pub fn format_amounts(amounts: &[TokenAmount]) -> String {
    if amounts.is_empty() {
        return "nothing".to_string();
    }
    amounts
        .iter()
        .map(|a| format!("{} {}", a.amount, a.token))
        .join(" and ")
}

/// Same as [`format_amounts`] for raw transfers.
pub fn format_transfers(transfers: &[Transfer]) -> String {
    let amounts: Vec<TokenAmount> = transfers
        .iter()
        .map(|t| TokenAmount {
            token: t.token,
            amount: t.value,
        })
        .collect();
    format_amounts(&amounts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::*;

    fn transfer(symbol: &str, from: &str, to: &str, value: &str) -> Transfer {
        Transfer {
            token: token(symbol),
            from: address_from_str(from),
            to: address_from_str(to),
            value: wad(value),
        }
    }

    #[test]
    fn test_incoming_and_outgoing() {
        let us = address_from_str("US");
        let transfers = vec![
            transfer("SAI", "US", "OTC", "100"),
            transfer("SKR", "OTC", "US", "105"),
            transfer("GEM", "OTC", "THEM", "1"),
        ];
        assert_eq!(outgoing(&transfers, us), vec![transfers[0]]);
        assert_eq!(incoming(&transfers, us), vec![transfers[1]]);
    }

    #[test]
    fn test_net_movement() {
        let us = address_from_str("US");
        let transfers = vec![
            transfer("SAI", "US", "OTC", "100"),
            transfer("SKR", "OTC", "US", "105"),
            transfer("SKR", "US", "OTC", "105"),
            transfer("GEM", "OTC", "US", "110"),
            transfer("GEM", "US", "OTC", "110"),
            transfer("SAI", "OTC", "US", "115"),
        ];
        let net = net_movement(&transfers, us).unwrap();
        assert_eq!(
            net,
            vec![TokenAmount {
                token: token("SAI"),
                amount: wad("15")
            }]
        );
        assert_eq!(
            format_amounts(&net),
            format!("15.000000000000000000 {}", token("SAI"))
        );
    }

    #[test]
    fn test_format_nothing() {
        let us = address_from_str("US");
        let transfers = vec![
            transfer("SAI", "US", "OTC", "10"),
            transfer("SAI", "OTC", "US", "10"),
        ];
        assert_eq!(format_amounts(&net_movement(&transfers, us).unwrap()), "nothing");
        assert_eq!(format_transfers(&[]), "nothing");
    }

    #[test]
    fn test_format_transfers() {
        let transfers = vec![
            transfer("SAI", "US", "OTC", "1.5"),
            transfer("SKR", "US", "OTC", "2"),
        ];
        assert_eq!(
            format_transfers(&transfers),
            format!(
                "1.500000000000000000 {} and 2.000000000000000000 {}",
                token("SAI"),
                token("SKR")
            )
        );
    }
}
