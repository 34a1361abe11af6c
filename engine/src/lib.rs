//! Settlement engine and composition root for ember.
//!
//! `IncentiveEngine` owns the vote ledger, emission schedule, gauge registry
//! and sink bindings, holds the collaborator handles, and exposes the public
//! operations: voting, lazy settlement over historical periods, batch
//! distribution with per-gauge failure isolation, and the governance-gated
//! gauge lifecycle.

pub mod distribute;
pub mod engine;
pub mod error;
pub mod recovery;

pub use distribute::{DistributionReport, GaugeFailure};
pub use engine::IncentiveEngine;
pub use error::EngineError;
pub use recovery::{RecoveryLog, SweptEmission};
