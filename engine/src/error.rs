use ember_emission::EmissionError;
use ember_gauges::GaugeError;
use ember_hooks::HookError;
use ember_ledger::LedgerError;
use ember_types::{Address, MathError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0} is not the governance authority")]
    NotGovernance(Address),

    #[error("settlement already in progress")]
    SettlementInProgress,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Gauge(#[from] GaugeError),

    #[error(transparent)]
    Emission(#[from] EmissionError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Math(#[from] MathError),
}
