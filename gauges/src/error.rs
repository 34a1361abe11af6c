use ember_types::{Address, GaugeId, Period};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GaugeError {
    #[error("gauge already exists for pool {0}")]
    GaugeExists(Address),

    #[error("pool {0} is not a recognized venue")]
    UnknownPool(Address),

    #[error("token {0} is not whitelisted")]
    TokenNotWhitelisted(Address),

    #[error("unknown gauge {0}")]
    UnknownGauge(GaugeId),

    #[error("gauge {0} is already dead")]
    AlreadyDead(GaugeId),

    #[error("gauge {0} is already alive")]
    AlreadyAlive(GaugeId),

    #[error("gauge {0} is alive; only dead gauges can be swept")]
    GaugeStillAlive(GaugeId),

    #[error("{1} is already settled for {0}")]
    AlreadySettled(GaugeId, Period),

    #[error("pool {0} is already recognized")]
    AlreadyRecognized(Address),

    #[error("token {0} is already whitelisted")]
    AlreadyWhitelisted(Address),

    #[error("token {0} is not on the whitelist")]
    NotWhitelisted(Address),

    #[error("gauge {dest} does not share the token pair of pool {pool}")]
    DestinationNotInPair { pool: Address, dest: GaugeId },
}
