//! Rule-based intent classification over a static lexicon.

mod classifier;
mod lexicon;

pub use classifier::{Intent, IntentKind, SafetyCategory, Severity, classify};
pub use lexicon::{EMOTIONAL_WORDS, FAMILY_WORDS, RESIGNATION_WORDS, SELF_HARM_CRITICAL_PHRASES};
