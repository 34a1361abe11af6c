use ember_types::Period;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmissionError {
    #[error("emission schedule already initialized")]
    AlreadyInitialized,

    #[error("emission schedule not initialized")]
    NotInitialized,

    #[error("multiplier already updated in {0}")]
    AlreadyUpdated(Period),

    #[error("multiplier unchanged at {0} bps")]
    Unchanged(u32),

    #[error("multiplier step {from} -> {to} exceeds the {max_step} bps bound")]
    StepTooLarge { from: u32, to: u32, max_step: u32 },

    #[error("arithmetic overflow in emission accounting")]
    Overflow,
}
