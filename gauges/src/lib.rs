//! Gauge registry for the ember engine.
//!
//! Tracks pool↔gauge associations, the alive/dead lifecycle, redirection
//! pointers for pools that accumulate multiple gauges, per-gauge settled
//! markers, the recognized-pool directory, and the token whitelist.

pub mod error;
pub mod gauge;
pub mod registry;
pub mod set;

pub use error::GaugeError;
pub use gauge::{Gauge, GaugeKind, PoolVenue};
pub use registry::GaugeRegistry;
pub use set::IndexedSet;
