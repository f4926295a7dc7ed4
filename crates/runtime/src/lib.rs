//! Engine runtime: session registry plus the turn pipeline.

mod pipeline;

pub use pipeline::{InferenceError, REFUSAL_TEXT, TurnOutput, VoiceRuntime};
