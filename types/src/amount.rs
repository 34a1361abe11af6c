//! Token units and the two-token reward split.
//!
//! Amounts are raw `u128` integers to avoid floating-point errors. The
//! smallest unit is 1 raw; one whole EMBER is `EMBER_UNIT` raw.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw units per whole EMBER token (18 decimals).
pub const EMBER_UNIT: u128 = 1_000_000_000_000_000_000;

/// Fixed-point denominator for percentage-like parameters (basis points).
pub const BASIS: u32 = 10_000;

/// Which of the two reward tokens a settled share is paid in.
///
/// Every settlement is split into a primary share (paid in EMBER) and an
/// alternate share converted into the boosted derivative before notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardToken {
    /// The protocol emission token.
    Primary,
    /// The converted alternate-token share.
    Alt,
}

impl fmt::Display for RewardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardToken::Primary => write!(f, "primary"),
            RewardToken::Alt => write!(f, "alt"),
        }
    }
}
