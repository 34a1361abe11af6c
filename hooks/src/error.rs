use ember_types::GaugeId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    #[error("no reward sink bound for {0}")]
    MissingSink(GaugeId),

    #[error("collaborator call failed: {0}")]
    Failed(String),
}
