//! Structured turn trace emitted with every response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use desi_contract::{Section, Skeleton};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailAction {
    None,
    Override,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailTrace {
    pub category: String,
    pub severity: String,
    pub action: GuardrailAction,
}

impl GuardrailTrace {
    pub fn none() -> Self {
        Self {
            category: "none".to_string(),
            severity: "none".to_string(),
            action: GuardrailAction::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    ContractLoadFailure,
    SelectionExhausted,
    RotationMemoryReset,
    AssemblyFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackLevel {
    SkeletonLocal,
    EnglishSafe,
    Absolute,
}

/// Fallback annotation.  Present only on turns that took a fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackMeta {
    pub fallback_reason: FallbackReason,
    pub fallback_level: FallbackLevel,
}

/// The full per-turn trace.  Immutable once assembled; contains no
/// timestamps, request ids, or any other nondeterministic field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Emotional turn index of this turn; absent on non-emotional turns.
    pub turn: Option<u64>,
    pub guardrail: GuardrailTrace,
    pub skeleton: Option<Skeleton>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_profile: Option<String>,
    pub selection: BTreeMap<Section, u32>,
    pub replay_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FallbackMeta>,
}
