//! Collaborator interfaces for the ember engine.
//!
//! The engine treats its external collaborators — the staking/voting-power
//! vault, per-gauge reward sinks, the pool fee router, and the token
//! converter — as black boxes behind these traits. The `Null*` types are
//! deterministic in-memory implementations for testing: controllable
//! programmatically, never touching the filesystem or network, with
//! injectable failures.

pub mod convert;
pub mod error;
pub mod fees;
pub mod sink;
pub mod staking;

pub use convert::{NullConverter, TokenConverter};
pub use error::HookError;
pub use fees::{FeeRouter, NullFeeRouter};
pub use sink::{NullSink, RewardSink, SinkSet};
pub use staking::{NullStaking, StakingSource};
