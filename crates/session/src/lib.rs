//! Session-owned voice state and its registry.

mod registry;
mod state;

use thiserror::Error;

use desi_contract::{PoolKey, Skeleton};

pub use registry::{SessionHandle, SessionRegistry};
pub use state::{
    EscalationState, RotationMemory, SessionVoiceState, VariantUsage, VariantUsageWindow,
};

/// Session-state failure (taxonomy E3).
#[derive(Debug, Error)]
pub enum StateError {
    #[error("rotation memory inconsistent for pool {pool}: {detail}")]
    RotationInconsistent { pool: PoolKey, detail: String },
    #[error("invalid skeleton transition {from:?} -> {to}")]
    InvalidTransition {
        from: Option<Skeleton>,
        to: Skeleton,
    },
}
