//! Deterministic safe output when the pipeline cannot complete normally.
//!
//! Three levels, tried in order from the entry level the error class allows:
//! variant 0 of the turn's own pools, the same sections in English, then the
//! compiled-in per-skeleton strings.  No retries, no regeneration, no silent
//! recovery; the same error on the same state always lands on the same text.

use tracing::warn;

use desi_contract::{ContractStore, Language, Skeleton};
use desi_trace::FallbackLevel;

use crate::assembler::assemble;
use crate::selector::SelectedVariant;

/// Immutable per-skeleton strings compiled into the binary.  The only legal
/// output besides contract text.
pub fn absolute_text(skeleton: Skeleton) -> &'static str {
    match skeleton {
        Skeleton::A => "I hear you. If you want, you can tell me more.",
        Skeleton::B => "That sounds like a lot to carry. I'm here with you.",
        Skeleton::C => "That sounds exhausting. We can just stay here for a moment.",
        Skeleton::D => "Let's keep this very small. That's enough for now.",
    }
}

/// A resolved fallback: the level that produced text, the variant-0 picks
/// (empty at the absolute level), and the text itself.
#[derive(Debug, Clone)]
pub struct FallbackPlan {
    pub level: FallbackLevel,
    pub sections: Vec<SelectedVariant>,
    pub text: String,
}

impl FallbackPlan {
    /// Absolute fallbacks leave rotation memory and the emotional turn
    /// index untouched; the two contract-backed levels commit both.
    pub fn commits_state(&self) -> bool {
        self.level != FallbackLevel::Absolute
    }
}

/// Variant-0 sections for `(skeleton, language)`, or `None` when any
/// required pool is missing.
fn variant_zero_sections(
    contract: &ContractStore,
    skeleton: Skeleton,
    language: Language,
) -> Option<Vec<SelectedVariant>> {
    let mut sections = Vec::new();
    for &section in skeleton.policy().sections {
        let entry = contract.variants(skeleton, language, section).first()?;
        sections.push(SelectedVariant {
            section,
            variant_id: entry.variant_id,
            text: entry.text.clone(),
            exhausted: false,
        });
    }
    Some(sections)
}

/// Resolve the fallback hierarchy for one turn.
pub fn plan_fallback(
    contract: Option<&ContractStore>,
    skeleton: Skeleton,
    language: Language,
    entry_level: FallbackLevel,
) -> FallbackPlan {
    let try_local = entry_level == FallbackLevel::SkeletonLocal;
    let try_english = entry_level != FallbackLevel::Absolute;

    if let Some(store) = contract {
        if try_local {
            if let Some(sections) = variant_zero_sections(store, skeleton, language) {
                if let Ok(text) = assemble(&sections) {
                    return FallbackPlan {
                        level: FallbackLevel::SkeletonLocal,
                        sections,
                        text,
                    };
                }
            }
        }
        if try_english && language != Language::En {
            if let Some(sections) = variant_zero_sections(store, skeleton, Language::En) {
                if let Ok(text) = assemble(&sections) {
                    return FallbackPlan {
                        level: FallbackLevel::EnglishSafe,
                        sections,
                        text,
                    };
                }
            }
        }
    }

    warn!(%skeleton, %language, "serving absolute fallback");
    FallbackPlan {
        level: FallbackLevel::Absolute,
        sections: Vec::new(),
        text: absolute_text(skeleton).to_string(),
    }
}
