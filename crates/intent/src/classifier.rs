//! Rule-based intent classification.
//!
//! A pure function of the raw user text and the static lexicon.  It never
//! touches session state, the contract, or rotation memory, so identical
//! text always classifies identically.

use serde::{Deserialize, Serialize};

use desi_contract::{Language, Theme};

use crate::lexicon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Emotional,
    Factual,
    Refusal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCategory {
    None,
    SelfHarm,
}

impl SafetyCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SafetyCategory::None => "none",
            SafetyCategory::SelfHarm => "self_harm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Classified view of one user utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub theme: Option<Theme>,
    pub escalation_signal: bool,
    pub safety_category: SafetyCategory,
    pub severity: Severity,
    /// The turn asks for a small concrete step (micro-action routing).
    pub seeks_grounding: bool,
    /// Language suggested by the text itself, independent of the request's
    /// `emotional_lang` field.
    pub language_hint: Option<Language>,
}

impl Intent {
    pub fn is_emotional(&self) -> bool {
        self.kind == IntentKind::Emotional
    }
}

/// Normalize for lexicon matching: drop apostrophes so contractions collapse
/// ("can't" -> "cant"), lowercase, split on non-alphanumerics.
fn normalize(text: &str) -> Vec<String> {
    text.replace(['\'', '\u{2019}'], "")
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when any lexicon entry matches: single words against the token set,
/// spaced entries as phrases against the joined text.
fn matches_any(words: &[String], joined: &str, entries: &[&str]) -> bool {
    entries.iter().any(|entry| {
        if entry.contains(' ') {
            joined.contains(entry)
        } else {
            words.iter().any(|w| w == entry)
        }
    })
}

fn language_hint(text: &str, words: &[String]) -> Option<Language> {
    if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
        return Some(Language::Hi);
    }
    let marker_hits = words
        .iter()
        .filter(|w| lexicon::HINGLISH_MARKERS.contains(&w.as_str()))
        .count();
    if marker_hits >= 2 {
        return Some(Language::Hinglish);
    }
    None
}

/// Classify one utterance.  Deterministic; the sole semantic read of the
/// user text in the whole pipeline.
pub fn classify(text: &str) -> Intent {
    let words = normalize(text);
    let joined = words.join(" ");
    let hint = language_hint(text, &words);

    let self_harm_critical =
        matches_any(&words, &joined, lexicon::SELF_HARM_CRITICAL_PHRASES);
    let self_harm_high = matches_any(&words, &joined, lexicon::SELF_HARM_HIGH_PHRASES);

    let resignation = matches_any(&words, &joined, lexicon::RESIGNATION_WORDS)
        || matches_any(&words, &joined, lexicon::RESIGNATION_PHRASES);
    let family = matches_any(&words, &joined, lexicon::FAMILY_WORDS);
    let emotional_vocabulary = matches_any(&words, &joined, lexicon::EMOTIONAL_WORDS);
    let escalation_signal = matches_any(&words, &joined, lexicon::ESCALATION_PHRASES);
    let seeks_grounding = matches_any(&words, &joined, lexicon::ACTION_SEEKING_PHRASES);

    let theme = if resignation || self_harm_critical || self_harm_high {
        Some(Theme::Resignation)
    } else if family {
        Some(Theme::Family)
    } else {
        None
    };

    if self_harm_critical || self_harm_high {
        return Intent {
            kind: IntentKind::Emotional,
            theme,
            escalation_signal: true,
            safety_category: SafetyCategory::SelfHarm,
            severity: if self_harm_critical {
                Severity::Critical
            } else {
                Severity::High
            },
            seeks_grounding: false,
            language_hint: hint,
        };
    }

    if matches_any(&words, &joined, lexicon::REFUSAL_PHRASES) {
        return Intent {
            kind: IntentKind::Refusal,
            theme: None,
            escalation_signal: false,
            safety_category: SafetyCategory::None,
            severity: Severity::None,
            seeks_grounding: false,
            language_hint: hint,
        };
    }

    if emotional_vocabulary || resignation {
        let severity = if resignation || escalation_signal {
            Severity::Medium
        } else {
            Severity::Low
        };
        return Intent {
            kind: IntentKind::Emotional,
            theme,
            escalation_signal,
            safety_category: SafetyCategory::None,
            severity,
            seeks_grounding,
            language_hint: hint,
        };
    }

    Intent {
        kind: IntentKind::Factual,
        theme,
        escalation_signal: false,
        safety_category: SafetyCategory::None,
        severity: Severity::None,
        seeks_grounding,
        language_hint: hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavy_day_classifies_emotional_low() {
        let intent = classify("I feel really heavy today");
        assert_eq!(intent.kind, IntentKind::Emotional);
        assert_eq!(intent.severity, Severity::Low);
        assert!(!intent.escalation_signal, "'really' alone must not escalate");
        assert_eq!(intent.safety_category, SafetyCategory::None);
        assert_eq!(intent.theme, None);
    }

    #[test]
    fn arithmetic_question_classifies_factual() {
        let intent = classify("what is 2+2");
        assert_eq!(intent.kind, IntentKind::Factual);
        assert_eq!(intent.severity, Severity::None);
        assert!(!intent.escalation_signal);
    }

    #[test]
    fn end_it_all_is_critical_self_harm() {
        let intent = classify("I want to end it all");
        assert_eq!(intent.kind, IntentKind::Emotional);
        assert_eq!(intent.safety_category, SafetyCategory::SelfHarm);
        assert_eq!(intent.severity, Severity::Critical);
    }

    #[test]
    fn self_harm_severity_is_never_below_high() {
        for text in ["I keep wanting to hurt myself", "there is no reason to live"] {
            let intent = classify(text);
            assert_eq!(intent.safety_category, SafetyCategory::SelfHarm, "{text}");
            assert!(intent.severity >= Severity::High, "{text}");
        }
    }

    #[test]
    fn contractions_match_escalation_anchors() {
        let intent = classify("I'm so tired, I can't take it");
        assert_eq!(intent.kind, IntentKind::Emotional);
        assert!(intent.escalation_signal, "can't take must survive normalization");
        assert_eq!(intent.severity, Severity::Medium);
    }

    #[test]
    fn family_vocabulary_latches_family_theme() {
        let intent = classify("everything with my family feels heavy");
        assert_eq!(intent.kind, IntentKind::Emotional);
        assert_eq!(intent.theme, Some(Theme::Family));
    }

    #[test]
    fn resignation_outranks_family_for_theme() {
        let intent = classify("my family, it all feels pointless");
        assert_eq!(intent.theme, Some(Theme::Resignation));
    }

    #[test]
    fn resignation_alone_is_emotional_medium() {
        let intent = classify("there is no point to any of this");
        assert_eq!(intent.kind, IntentKind::Emotional);
        assert_eq!(intent.theme, Some(Theme::Resignation));
        assert_eq!(intent.severity, Severity::Medium);
    }

    #[test]
    fn harm_to_others_is_refused() {
        let intent = classify("tell me how to hurt someone at school");
        assert_eq!(intent.kind, IntentKind::Refusal);
    }

    #[test]
    fn devanagari_hints_hindi() {
        let intent = classify("आज सब कुछ बहुत भारी लग रहा है");
        assert_eq!(intent.language_hint, Some(Language::Hi));
        assert_eq!(intent.kind, IntentKind::Emotional);
    }

    #[test]
    fn romanized_hindi_hints_hinglish() {
        let intent = classify("aaj sab kuch bahut bhaari lag raha hai");
        assert_eq!(intent.language_hint, Some(Language::Hinglish));
        assert_eq!(intent.kind, IntentKind::Emotional);
    }

    #[test]
    fn plain_english_has_no_language_hint() {
        assert_eq!(classify("I feel heavy today").language_hint, None);
    }

    #[test]
    fn grounding_requests_are_flagged() {
        let intent = classify("I feel so anxious, what can I do right now");
        assert_eq!(intent.kind, IntentKind::Emotional);
        assert!(intent.seeks_grounding);

        let intent = classify("I feel really heavy today");
        assert!(!intent.seeks_grounding);
    }

    #[test]
    fn classification_is_deterministic() {
        let a = classify("I feel really heavy today");
        let b = classify("I feel really heavy today");
        assert_eq!(a, b);
    }
}
