//! Replay hash derivation.
//!
//! The hash covers exactly the documented input set: prompt, emotional
//! language, guardrail category and severity, skeleton, tone profile, and
//! the per-section selection.  Nothing else observable may move the hash.

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

use desi_contract::Section;

use crate::canonical::{CanonicalError, canonicalize};

/// The deterministic input set of one turn's replay hash.
#[derive(Debug, Clone)]
pub struct ReplayInputs<'a> {
    pub prompt: &'a str,
    pub emotional_lang: &'a str,
    pub guardrail_category: &'a str,
    pub guardrail_severity: &'a str,
    pub skeleton: Option<&'a str>,
    pub tone_profile: Option<&'a str>,
    /// Chosen variant per section.  Order is irrelevant; the canonical form
    /// sorts keys.
    pub selection: &'a [(Section, u32)],
}

/// Derive `"sha256:" + lowercase hex` over the canonical serialization of
/// the input set.
pub fn replay_hash(inputs: &ReplayInputs<'_>) -> Result<String, CanonicalError> {
    let mut selection = Map::new();
    for (section, variant_id) in inputs.selection {
        selection.insert(section.as_str().to_string(), json!(variant_id));
    }

    let value = json!({
        "prompt": inputs.prompt,
        "emotional_lang": inputs.emotional_lang,
        "guardrail_category": inputs.guardrail_category,
        "guardrail_severity": inputs.guardrail_severity,
        "skeleton": inputs.skeleton,
        "tone_profile": inputs.tone_profile,
        "selection": Value::Object(selection),
    });

    let canonical = canonicalize(&value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("sha256:{:x}", hasher.finalize()))
}
