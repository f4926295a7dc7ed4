//! Turn traces, canonical JSON, and the replay hash.

mod canonical;
mod replay;
mod trace;

pub use canonical::{CanonicalError, canonicalize};
pub use replay::{ReplayInputs, replay_hash};
pub use trace::{
    FallbackLevel, FallbackMeta, FallbackReason, GuardrailAction, GuardrailTrace, Trace,
};
