//! Pool fee-split collaborator.

use crate::error::HookError;
use ember_types::Address;
use std::sync::Mutex;

/// Adjusts a pool's trading-fee split once per period as settlement rolls
/// over, parameterized by whether the pool's gauge is alive.
pub trait FeeRouter {
    fn sync_fee_split(&self, pool: &Address, gauge_alive: bool) -> Result<(), HookError>;
}

/// In-memory fee router recording every sync call.
pub struct NullFeeRouter {
    calls: Mutex<Vec<(Address, bool)>>,
}

impl NullFeeRouter {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every `(pool, gauge_alive)` sync recorded so far.
    pub fn calls(&self) -> Vec<(Address, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for NullFeeRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl FeeRouter for NullFeeRouter {
    fn sync_fee_split(&self, pool: &Address, gauge_alive: bool) -> Result<(), HookError> {
        self.calls.lock().unwrap().push((pool.clone(), gauge_alive));
        Ok(())
    }
}
