//! Alternate-token conversion collaborator.

use crate::error::HookError;
use ember_types::{apply_bps, BASIS};
use std::sync::Mutex;

/// Converts a primary-token amount into the alternate reward token before it
/// is notified to a sink.
pub trait TokenConverter {
    /// Convert `amount` and return the amount received in the alternate token.
    fn convert(&self, amount: u128) -> Result<u128, HookError>;
}

/// In-memory converter with a configurable rate (basis points of input).
pub struct NullConverter {
    rate_bps: u32,
    converted: Mutex<u128>,
}

impl NullConverter {
    /// A 1:1 converter.
    pub fn new() -> Self {
        Self::with_rate_bps(BASIS)
    }

    pub fn with_rate_bps(rate_bps: u32) -> Self {
        Self {
            rate_bps,
            converted: Mutex::new(0),
        }
    }

    /// Total input amount converted so far.
    pub fn total_converted(&self) -> u128 {
        *self.converted.lock().unwrap()
    }
}

impl Default for NullConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenConverter for NullConverter {
    fn convert(&self, amount: u128) -> Result<u128, HookError> {
        let out = apply_bps(amount, self.rate_bps)
            .map_err(|e| HookError::Failed(e.to_string()))?;
        *self.converted.lock().unwrap() += amount;
        Ok(out)
    }
}
