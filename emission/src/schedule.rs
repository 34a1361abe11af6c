//! The emission schedule state machine.

use crate::error::EmissionError;
use ember_ledger::VoteLedger;
use ember_types::{apply_bps, EngineParams, EpochClock, Period, Timestamp};
use serde::{Deserialize, Serialize};

/// Weekly emission state.
///
/// Mutates only at period rollover and on governance multiplier updates (at
/// most once per period). Rollover is idempotent: calling it twice in one
/// period mints nothing the second time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmissionSchedule {
    weekly_emission: u128,
    /// Growth/decay applied to the weekly emission each rollover, in basis
    /// points.
    multiplier_bps: u32,
    /// Largest multiplier change one period may apply, in basis points.
    max_step_bps: u32,
    first_period: Period,
    active_period: Period,
    last_multiplier_update: Period,
    /// Supply minted so far (starts at the pre-mine).
    total_supply: u128,
    max_supply: u128,
    initialized: bool,
}

impl EmissionSchedule {
    pub fn new(params: &EngineParams) -> Self {
        Self {
            weekly_emission: params.initial_weekly_emission,
            multiplier_bps: params.default_multiplier_bps,
            max_step_bps: params.max_multiplier_step_bps,
            first_period: Period::GENESIS,
            active_period: Period::GENESIS,
            last_multiplier_update: Period::GENESIS,
            total_supply: params.initial_supply,
            max_supply: params.max_supply,
            initialized: false,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn weekly_emission(&self) -> u128 {
        self.weekly_emission
    }

    pub fn multiplier_bps(&self) -> u32 {
        self.multiplier_bps
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn active_period(&self) -> Period {
        self.active_period
    }

    pub fn first_period(&self) -> Period {
        self.first_period
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// What the next rollover would mint: the multiplied weekly emission,
    /// clamped so the supply ceiling is never crossed.
    pub fn next_emission(&self) -> Result<u128, EmissionError> {
        let proposed =
            apply_bps(self.weekly_emission, self.multiplier_bps).map_err(|_| EmissionError::Overflow)?;
        if proposed == 0 {
            return Ok(0);
        }
        let headroom = self.max_supply.saturating_sub(self.total_supply);
        Ok(proposed.min(headroom))
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// One-time genesis bootstrap.
    ///
    /// Anchors the schedule to the current period and mints the initial
    /// weekly emission for manual distribution — nothing is forwarded to the
    /// ledger at genesis. Backdating `last_multiplier_update` one period
    /// leaves the first multiplier update available immediately.
    pub fn init_genesis(
        &mut self,
        clock: &EpochClock,
        now: Timestamp,
    ) -> Result<u128, EmissionError> {
        if self.initialized {
            return Err(EmissionError::AlreadyInitialized);
        }
        let current = clock.period_at(now);
        self.active_period = current;
        self.first_period = current;
        self.last_multiplier_update = current.prev();
        self.initialized = true;

        let minted = self
            .weekly_emission
            .min(self.max_supply.saturating_sub(self.total_supply));
        self.total_supply = self
            .total_supply
            .checked_add(minted)
            .ok_or(EmissionError::Overflow)?;
        Ok(minted)
    }

    /// Rotate into the current period if it is newer than the active one.
    ///
    /// Computes the next weekly emission and, when nonzero, mints it and
    /// credits the ledger's reward pool for the new period. Returns what was
    /// minted, or `None` when the period has already rotated.
    pub fn rollover(
        &mut self,
        ledger: &mut VoteLedger,
        clock: &EpochClock,
        now: Timestamp,
    ) -> Result<Option<(Period, u128)>, EmissionError> {
        if !self.initialized {
            return Err(EmissionError::NotInitialized);
        }
        let current = clock.period_at(now);
        if current <= self.active_period {
            return Ok(None);
        }
        self.active_period = current;
        let minted = self.next_emission()?;
        self.weekly_emission = minted;
        if minted > 0 {
            self.total_supply = self
                .total_supply
                .checked_add(minted)
                .ok_or(EmissionError::Overflow)?;
            ledger
                .add_reward_for_period(current, minted)
                .map_err(|_| EmissionError::Overflow)?;
        }
        Ok(Some((current, minted)))
    }

    /// Governance-gated multiplier change, at most once per period and
    /// bounded to `max_step_bps` per change. A no-op value is rejected so
    /// the once-per-period slot is not wasted.
    pub fn update_multiplier(&mut self, new_bps: u32) -> Result<(), EmissionError> {
        if self.last_multiplier_update == self.active_period {
            return Err(EmissionError::AlreadyUpdated(self.active_period));
        }
        if new_bps == self.multiplier_bps {
            return Err(EmissionError::Unchanged(new_bps));
        }
        let step = self.multiplier_bps.abs_diff(new_bps);
        if step > self.max_step_bps {
            return Err(EmissionError::StepTooLarge {
                from: self.multiplier_bps,
                to: new_bps,
                max_step: self.max_step_bps,
            });
        }
        self.multiplier_bps = new_bps;
        self.last_multiplier_update = self.active_period;
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Serialize the schedule for persistence.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// Restore a schedule from serialized bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        bincode::deserialize(data).ok()
    }
}
