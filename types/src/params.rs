//! Engine parameters — every governance-tunable value in one struct.

use crate::amount::EMBER_UNIT;
use serde::{Deserialize, Serialize};

/// All tunable parameters of the incentive engine.
///
/// Owned by the engine and passed by reference into the components that need
/// them; there is no global singleton.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineParams {
    // ── Epochs ───────────────────────────────────────────────────────────
    /// Length of one voting/settlement period in seconds.
    pub period_secs: u64,

    // ── Emissions ────────────────────────────────────────────────────────
    /// Weekly emission at genesis, raw units.
    pub initial_weekly_emission: u128,

    /// Multiplier applied to the weekly emission at each rollover
    /// (basis points; 9_900 = 1% weekly decay).
    pub default_multiplier_bps: u32,

    /// Largest multiplier change one period may apply (basis points).
    pub max_multiplier_step_bps: u32,

    /// Supply already minted before the engine starts (pre-mine), raw units.
    pub initial_supply: u128,

    /// Hard ceiling on total minted supply, raw units.
    pub max_supply: u128,

    // ── Settlement ───────────────────────────────────────────────────────
    /// Share of each settled amount paid as the alternate token
    /// (basis points of the claimable amount).
    pub alt_split_bps: u32,

    /// Window over which reward sinks stream a notified amount, in seconds.
    /// A share that rounds to zero per second of this window is too small
    /// to stream and leaves its period pending.
    pub stream_window_secs: u64,
}

impl EngineParams {
    /// Ember mainnet defaults.
    pub fn defaults() -> Self {
        Self {
            period_secs: 7 * 24 * 3600,
            initial_weekly_emission: 2_600_000 * EMBER_UNIT,
            default_multiplier_bps: 9_900, // 1% weekly decay
            max_multiplier_step_bps: 2_500, // ±25% per period
            initial_supply: 20_000_000 * EMBER_UNIT,
            max_supply: 500_000_000 * EMBER_UNIT,
            alt_split_bps: 3_000, // 30% alternate share
            stream_window_secs: 7 * 24 * 3600,
        }
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::defaults()
    }
}
