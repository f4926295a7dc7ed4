//! Skeleton and language resolution.
//!
//! The last semantic decision in the pipeline: everything downstream works
//! from the resolved context and never re-reads user text.  The resolver is
//! a pure function of the intent and the previous session state; the reset
//! directives it emits are applied by the runtime to the turn's working copy
//! of the state.

use desi_contract::{Language, Skeleton, Theme};
use desi_intent::{Intent, SafetyCategory, Severity};
use desi_session::{EscalationState, SessionVoiceState};

/// State adjustment the runtime applies before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDirective {
    /// Full reset of the session's voice state.
    Hard,
    /// Clear the pools of the skeleton just escalated into.
    SkeletonPools(Skeleton),
    /// Clear the pools constrained by a newly latched theme.
    ThemePools(Theme),
    /// Clear the pools of the language just switched to.
    LanguagePools(Language),
}

/// Resolved voice context for an emotional turn.
#[derive(Debug, Clone)]
pub struct ResolvedVoice {
    pub skeleton: Skeleton,
    pub language: Language,
    pub escalation_state: EscalationState,
    pub latched_theme: Option<Theme>,
    pub resets: Vec<ResetDirective>,
    /// Safety guardrail must replace the assembled text.
    pub guardrail_override: bool,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    /// Non-emotional turn: no skeleton; a hard reset fires when the session
    /// was previously on the emotional path.
    NonEmotional { hard_reset: bool },
    Emotional(ResolvedVoice),
}

fn rank_to_skeleton(rank: u8) -> Skeleton {
    match rank {
        0 => Skeleton::A,
        1 => Skeleton::B,
        _ => Skeleton::C,
    }
}

/// Resolve the skeleton, language, escalation state, and latched theme for
/// one turn.
pub fn resolve(
    intent: &Intent,
    state: &SessionVoiceState,
    requested_language: Option<Language>,
) -> Resolution {
    if !intent.is_emotional() {
        return Resolution::NonEmotional {
            hard_reset: state.last_skeleton.is_some() || state.emotional_turn_index > 0,
        };
    }

    let language = requested_language
        .or(intent.language_hint)
        .unwrap_or(Language::En);

    let mut resets = Vec::new();

    // Escalation resolution: a calm emotional turn under a latched C session
    // releases the latch through the full-reset path, never by stepping down.
    let calm = intent.severity <= Severity::Low
        && !intent.escalation_signal
        && intent.theme.is_none()
        && intent.safety_category == SafetyCategory::None;
    let resolved_from_c = state.escalation_state == EscalationState::Latched
        && state.last_skeleton == Some(Skeleton::C)
        && calm;

    let (prev_skeleton, prev_escalation, prev_theme, prev_language) = if resolved_from_c {
        resets.push(ResetDirective::Hard);
        (None, EscalationState::None, None, None)
    } else {
        (
            state.last_skeleton,
            state.escalation_state,
            state.latched_theme,
            state.last_language,
        )
    };

    // Theme latching: new themes stick; a change clears the affected pools.
    let latched_theme = intent.theme.or(prev_theme);
    if let Some(theme) = intent.theme {
        if prev_theme != Some(theme) {
            resets.push(ResetDirective::ThemePools(theme));
        }
    }

    let guardrail_override =
        intent.safety_category == SafetyCategory::SelfHarm && intent.severity >= Severity::High;
    let latched_now = guardrail_override || latched_theme == Some(Theme::Resignation);

    let prev_rank = prev_skeleton
        .filter(|s| *s != Skeleton::D)
        .map(Skeleton::escalation_rank);

    let skeleton = if latched_now || prev_escalation == EscalationState::Latched {
        Skeleton::C
    } else if latched_theme == Some(Theme::Family) {
        // Family never resolves to A or D.
        if prev_skeleton == Some(Skeleton::C) {
            Skeleton::C
        } else {
            Skeleton::B
        }
    } else if intent.seeks_grounding
        && !intent.escalation_signal
        && prev_rank.unwrap_or(0) == 0
        && prev_skeleton != Some(Skeleton::C)
    {
        // Micro-action routing is only reachable before the ladder climbs.
        Skeleton::D
    } else {
        let mut rank = prev_rank.unwrap_or(0);
        if intent.escalation_signal {
            rank = (rank + 1).min(Skeleton::C.escalation_rank());
        }
        rank_to_skeleton(rank)
    };

    // Moving up the ladder clears the pools of the skeleton being entered.
    let prev_ladder_rank = prev_rank.unwrap_or(0);
    let climbed = skeleton != Skeleton::D
        && prev_skeleton.is_some()
        && skeleton.escalation_rank() > prev_ladder_rank;
    if climbed {
        resets.push(ResetDirective::SkeletonPools(skeleton));
    }

    let escalation_state = if latched_now || prev_escalation == EscalationState::Latched {
        EscalationState::Latched
    } else if climbed {
        EscalationState::Escalating
    } else {
        prev_escalation
    };

    // Switching language mid-session restarts rotation for that language.
    if let Some(previous) = prev_language {
        if previous != language {
            resets.push(ResetDirective::LanguagePools(language));
        }
    }

    Resolution::Emotional(ResolvedVoice {
        skeleton,
        language,
        escalation_state,
        latched_theme,
        resets,
        guardrail_override,
    })
}

/// Fixed skeleton-to-tone mapping surfaced in traces.
pub fn tone_profile(skeleton: Skeleton) -> &'static str {
    match skeleton {
        Skeleton::A => "gentle",
        Skeleton::B => "grounded",
        Skeleton::C => "still",
        Skeleton::D => "direct",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desi_intent::classify;

    fn fresh() -> SessionVoiceState {
        SessionVoiceState::new()
    }

    fn emotional(resolution: Resolution) -> ResolvedVoice {
        match resolution {
            Resolution::Emotional(voice) => voice,
            Resolution::NonEmotional { .. } => panic!("expected an emotional resolution"),
        }
    }

    #[test]
    fn plain_distress_on_a_fresh_session_resolves_a() {
        let intent = classify("I feel really heavy today");
        let voice = emotional(resolve(&intent, &fresh(), Some(Language::En)));
        assert_eq!(voice.skeleton, Skeleton::A);
        assert_eq!(voice.language, Language::En);
        assert_eq!(voice.escalation_state, EscalationState::None);
        assert!(!voice.guardrail_override);
        assert!(voice.resets.is_empty());
    }

    #[test]
    fn non_emotional_resets_only_after_emotional_traffic() {
        let intent = classify("what is 2+2");
        match resolve(&intent, &fresh(), None) {
            Resolution::NonEmotional { hard_reset } => assert!(!hard_reset),
            _ => panic!("factual turn must not resolve a skeleton"),
        }

        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::A);
        state.emotional_turn_index = 2;
        match resolve(&intent, &state, None) {
            Resolution::NonEmotional { hard_reset } => assert!(hard_reset),
            _ => panic!("factual turn must not resolve a skeleton"),
        }
    }

    #[test]
    fn language_defaults_to_english() {
        let intent = classify("I feel heavy");
        let voice = emotional(resolve(&intent, &fresh(), None));
        assert_eq!(voice.language, Language::En);
    }

    #[test]
    fn detected_language_applies_when_no_request_language() {
        let intent = classify("aaj sab kuch bahut bhaari lag raha hai");
        let voice = emotional(resolve(&intent, &fresh(), None));
        assert_eq!(voice.language, Language::Hinglish);

        // An explicit request language wins over the hint.
        let voice = emotional(resolve(&intent, &fresh(), Some(Language::En)));
        assert_eq!(voice.language, Language::En);
    }

    #[test]
    fn family_theme_never_resolves_a_or_d() {
        let intent = classify("everything with my family feels heavy");
        let voice = emotional(resolve(&intent, &fresh(), None));
        assert_eq!(voice.skeleton, Skeleton::B);
        assert_eq!(voice.latched_theme, Some(Theme::Family));
        assert_eq!(
            voice.resets,
            vec![ResetDirective::ThemePools(Theme::Family)]
        );
    }

    #[test]
    fn escalation_signal_climbs_one_step_and_clears_new_pools() {
        let intent = classify("I'm so tired, I can't take it");
        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::A);
        state.emotional_turn_index = 1;
        state.last_language = Some(Language::En);

        let voice = emotional(resolve(&intent, &state, Some(Language::En)));
        assert_eq!(voice.skeleton, Skeleton::B);
        assert_eq!(voice.escalation_state, EscalationState::Escalating);
        assert!(voice.resets.contains(&ResetDirective::SkeletonPools(Skeleton::B)));
    }

    #[test]
    fn ladder_never_steps_down_without_a_reset() {
        let intent = classify("I feel heavy");
        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::B);
        state.escalation_state = EscalationState::Escalating;
        state.emotional_turn_index = 3;

        let voice = emotional(resolve(&intent, &state, None));
        assert_eq!(voice.skeleton, Skeleton::B, "calm turn must hold the ladder");
    }

    #[test]
    fn resignation_forces_latched_c() {
        let intent = classify("there is no point to any of this");
        let voice = emotional(resolve(&intent, &fresh(), None));
        assert_eq!(voice.skeleton, Skeleton::C);
        assert_eq!(voice.escalation_state, EscalationState::Latched);
        assert!(!voice.guardrail_override);
    }

    #[test]
    fn critical_self_harm_forces_c_with_override() {
        let intent = classify("I want to end it all");
        let voice = emotional(resolve(&intent, &fresh(), None));
        assert_eq!(voice.skeleton, Skeleton::C);
        assert_eq!(voice.escalation_state, EscalationState::Latched);
        assert!(voice.guardrail_override);
    }

    #[test]
    fn latched_session_stays_on_c_for_distressed_turns() {
        let intent = classify("I'm so tired and worn out, I can't take it");
        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::C);
        state.escalation_state = EscalationState::Latched;
        state.emotional_turn_index = 2;

        let voice = emotional(resolve(&intent, &state, None));
        assert_eq!(voice.skeleton, Skeleton::C);
        assert_eq!(voice.escalation_state, EscalationState::Latched);
        assert!(!voice.resets.contains(&ResetDirective::Hard));
    }

    #[test]
    fn calm_turn_under_latched_c_resolves_to_a_via_hard_reset() {
        let intent = classify("I feel a bit heavy but okay");
        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::C);
        state.escalation_state = EscalationState::Latched;
        state.emotional_turn_index = 4;

        let voice = emotional(resolve(&intent, &state, None));
        assert_eq!(voice.skeleton, Skeleton::A);
        assert_eq!(voice.escalation_state, EscalationState::None);
        assert_eq!(voice.resets.first(), Some(&ResetDirective::Hard));
    }

    #[test]
    fn grounding_request_resolves_d_before_the_ladder_climbs() {
        let intent = classify("I feel so anxious, what can I do right now");
        let voice = emotional(resolve(&intent, &fresh(), None));
        assert_eq!(voice.skeleton, Skeleton::D);

        // Once escalated, grounding requests stay on the ladder.
        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::B);
        state.emotional_turn_index = 1;
        let voice = emotional(resolve(&intent, &state, None));
        assert_eq!(voice.skeleton, Skeleton::B);
    }

    #[test]
    fn language_switch_clears_the_new_language_pools() {
        let intent = classify("I feel heavy");
        let mut state = fresh();
        state.last_skeleton = Some(Skeleton::A);
        state.last_language = Some(Language::En);
        state.emotional_turn_index = 1;

        let voice = emotional(resolve(&intent, &state, Some(Language::Hi)));
        assert_eq!(voice.language, Language::Hi);
        assert!(voice.resets.contains(&ResetDirective::LanguagePools(Language::Hi)));
    }

    #[test]
    fn tone_profiles_are_fixed_per_skeleton() {
        assert_eq!(tone_profile(Skeleton::A), "gentle");
        assert_eq!(tone_profile(Skeleton::B), "grounded");
        assert_eq!(tone_profile(Skeleton::C), "still");
        assert_eq!(tone_profile(Skeleton::D), "direct");
    }
}
