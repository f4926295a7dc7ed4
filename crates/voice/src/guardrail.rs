//! Safety guardrails.
//!
//! Evaluated after assembly.  Overrides are contract-backed: the replacement
//! string is the C validation-plus-closure constant for the turn's language,
//! falling back to English and then to the compiled-in C string.  No
//! guardrail ever emits text from outside the contract or the absolute set.

use desi_contract::{ContractStore, Language, Section, Skeleton};
use desi_intent::{Intent, SafetyCategory, Severity};
use desi_trace::{GuardrailAction, GuardrailTrace};

use crate::fallback::absolute_text;

#[derive(Debug, Clone)]
pub struct GuardrailVerdict {
    /// Replacement for the assembled response, when the guardrail fires.
    pub replacement_text: Option<String>,
    pub trace: GuardrailTrace,
}

/// The C constant used for safety overrides in `language`.
pub fn override_text(contract: Option<&ContractStore>, language: Language) -> String {
    if let Some(store) = contract {
        for lang in [language, Language::En] {
            let validation = store.variants(Skeleton::C, lang, Section::Validation);
            let closure = store.variants(Skeleton::C, lang, Section::Closure);
            if let (Some(v), Some(c)) = (validation.first(), closure.first()) {
                return format!("{} {}", v.text, c.text);
            }
        }
    }
    absolute_text(Skeleton::C).to_string()
}

/// Evaluate the guardrail for one turn.
pub fn evaluate(
    contract: Option<&ContractStore>,
    intent: &Intent,
    language: Language,
) -> GuardrailVerdict {
    if intent.safety_category == SafetyCategory::SelfHarm {
        let overrides = intent.severity >= Severity::High;
        return GuardrailVerdict {
            replacement_text: overrides.then(|| override_text(contract, language)),
            trace: GuardrailTrace {
                category: intent.safety_category.as_str().to_string(),
                severity: intent.severity.as_str().to_string(),
                action: if overrides {
                    GuardrailAction::Override
                } else {
                    GuardrailAction::None
                },
            },
        };
    }

    GuardrailVerdict {
        replacement_text: None,
        trace: GuardrailTrace::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desi_intent::classify;

    #[test]
    fn critical_self_harm_overrides_with_the_c_constant() {
        let contract = ContractStore::load_embedded().unwrap();
        let intent = classify("I want to end it all");

        let verdict = evaluate(Some(&contract), &intent, Language::En);
        assert_eq!(verdict.trace.category, "self_harm");
        assert_eq!(verdict.trace.severity, "critical");
        assert_eq!(verdict.trace.action, GuardrailAction::Override);
        assert_eq!(
            verdict.replacement_text.as_deref(),
            Some("That sounds exhausting. We can just stay here for a moment.")
        );
    }

    #[test]
    fn english_override_equals_the_absolute_c_string() {
        let contract = ContractStore::load_embedded().unwrap();
        assert_eq!(
            override_text(Some(&contract), Language::En),
            absolute_text(Skeleton::C)
        );
    }

    #[test]
    fn hindi_override_uses_hindi_contract_entries() {
        let contract = ContractStore::load_embedded().unwrap();
        assert_eq!(
            override_text(Some(&contract), Language::Hi),
            "यह सच में थका देने वाला है। हम बस थोड़ी देर यहीं रुक सकते हैं।"
        );
    }

    #[test]
    fn missing_contract_falls_back_to_the_absolute_c_string() {
        assert_eq!(override_text(None, Language::Hi), absolute_text(Skeleton::C));
    }

    #[test]
    fn ordinary_turns_pass_untouched() {
        let contract = ContractStore::load_embedded().unwrap();
        let intent = classify("I feel really heavy today");
        let verdict = evaluate(Some(&contract), &intent, Language::En);
        assert!(verdict.replacement_text.is_none());
        assert_eq!(verdict.trace.category, "none");
        assert_eq!(verdict.trace.action, GuardrailAction::None);
    }
}
