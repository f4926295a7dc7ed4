//! Closed error taxonomy of the voice pipeline.
//!
//! Four classes, nothing else: E1 contract load, E2 selection, E3 session
//! state, E4 assembly.  Every class maps to a fixed fallback reason and a
//! fixed entry level in the fallback hierarchy; errors never reach the
//! transport as internal detail.

use thiserror::Error;

use desi_contract::{ContractError, PoolKey};
use desi_session::StateError;
use desi_trace::{FallbackLevel, FallbackReason};

/// Selection failure (taxonomy E2).
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no variants for pool {0}")]
    EmptyPool(PoolKey),
    #[error("rotation memory references variant {variant_id} outside pool {pool} of {len} entries")]
    RotationInconsistent {
        pool: PoolKey,
        variant_id: u32,
        len: usize,
    },
}

/// Assembly failure (taxonomy E4).
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("empty text for section {0}")]
    EmptySection(desi_contract::Section),
    #[error("assembled response is empty")]
    EmptyResponse,
}

/// Umbrella over the four classes.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("contract load: {0}")]
    Contract(#[from] ContractError),
    #[error("selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("session state: {0}")]
    State(#[from] StateError),
    #[error("assembly: {0}")]
    Assembly(#[from] AssemblyError),
}

impl VoiceError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            VoiceError::Contract(_) => FallbackReason::ContractLoadFailure,
            VoiceError::Selection(SelectionError::RotationInconsistent { .. }) => {
                FallbackReason::RotationMemoryReset
            }
            VoiceError::Selection(_) => FallbackReason::SelectionExhausted,
            VoiceError::State(_) => FallbackReason::RotationMemoryReset,
            VoiceError::Assembly(_) => FallbackReason::AssemblyFailure,
        }
    }

    /// First level of the fallback hierarchy this class may use.
    pub fn entry_level(&self) -> FallbackLevel {
        match self {
            VoiceError::Contract(_) | VoiceError::Assembly(_) => FallbackLevel::Absolute,
            VoiceError::Selection(_) | VoiceError::State(_) => FallbackLevel::SkeletonLocal,
        }
    }
}
