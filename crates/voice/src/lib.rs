//! The deterministic voice pipeline core.
//!
//! Intent in, contract strings out: skeleton resolution, five-phase variant
//! selection, mechanical assembly, safety guardrails, and the fallback
//! hierarchy, all total functions of their declared inputs.

mod assembler;
mod error;
mod fallback;
mod guardrail;
mod resolver;
mod selector;

pub use assembler::assemble;
pub use error::{AssemblyError, SelectionError, VoiceError};
pub use fallback::{FallbackPlan, absolute_text, plan_fallback};
pub use guardrail::{GuardrailVerdict, evaluate as evaluate_guardrail, override_text};
pub use resolver::{ResetDirective, ResolvedVoice, Resolution, resolve, tone_profile};
pub use selector::{SelectedVariant, TurnContext, select_variant};
