use ember_hooks::HookError;
use ember_types::{Address, MathError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("pools/weights length mismatch: {pools} pools, {weights} weights")]
    LengthMismatch { pools: usize, weights: usize },

    #[error("vote requires at least one pool")]
    EmptyVote,

    #[error("{caller} is not authorized to act for {user}")]
    Unauthorized { caller: Address, user: Address },

    #[error("arithmetic overflow in vote accounting")]
    Overflow,

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Hook(#[from] HookError),
}
