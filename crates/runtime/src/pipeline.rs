//! Turn orchestration.
//!
//! One entry point, one strict DAG: classify, resolve, select, assemble,
//! guardrail, trace, commit.  The session lock is held for the whole
//! emotional pipeline; all state writes land in a working copy that replaces
//! the live state in a single assignment only after the turn has fully
//! succeeded.  Every internal failure is resolved here through the fallback
//! hierarchy; nothing below the transport ever sees pipeline internals.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use desi_config::AppConfig;
use desi_contract::{ContractError, ContractStore, Language, Section, Skeleton};
use desi_intent::{Intent, IntentKind, classify};
use desi_llm_client::{GenerativeModel, OllamaClient, StaticResponder};
use desi_session::{SessionRegistry, SessionVoiceState, StateError, VariantUsage};
use desi_trace::{
    FallbackLevel, FallbackMeta, FallbackReason, GuardrailTrace, ReplayInputs, Trace, replay_hash,
};
use desi_voice::{
    ResetDirective, ResolvedVoice, Resolution, SelectedVariant, SelectionError, TurnContext,
    VoiceError, assemble, evaluate_guardrail, plan_fallback, resolve, select_variant, tone_profile,
};

/// Fixed refusal text for requests the engine declines to serve.
pub const REFUSAL_TEXT: &str =
    "I can't help with that. If something is weighing on you, I'm here to listen.";

/// The only error the transport ever sees: the pipeline could not produce
/// any safe output.
#[derive(Debug, Error)]
#[error("Inference failed.")]
pub struct InferenceError;

/// One finished turn.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnOutput {
    pub response_text: String,
    pub trace: Trace,
}

pub struct VoiceRuntime {
    contract: Option<ContractStore>,
    registry: SessionRegistry,
    model: Arc<dyn GenerativeModel>,
}

impl VoiceRuntime {
    /// Build a runtime from a contract load result.  A failed load is not
    /// fatal here: the engine keeps serving absolute fallbacks on the
    /// emotional path.  Callers wanting fail-fast semantics check the load
    /// result themselves first.
    pub fn new(
        contract: Result<ContractStore, ContractError>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        let contract = match contract {
            Ok(store) => {
                info!(
                    pools = store.pool_count(),
                    variants = store.variant_count(),
                    version = store.version(),
                    "contract loaded"
                );
                Some(store)
            }
            Err(err) => {
                error!(error = %err, "contract load failed; serving absolute fallbacks");
                None
            }
        };
        Self {
            contract,
            registry: SessionRegistry::new(),
            model,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let contract = match &config.contract.path {
            Some(path) => ContractStore::load_file(path),
            None => ContractStore::load_embedded(),
        };
        let model: Arc<dyn GenerativeModel> = if config.uses_static_responder() {
            Arc::new(StaticResponder)
        } else {
            Arc::new(OllamaClient::new(
                &config.llm.ollama_base_url,
                &config.llm.ollama_model,
            ))
        };
        Self::new(contract, model)
    }

    pub fn contract(&self) -> Option<&ContractStore> {
        self.contract.as_ref()
    }

    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }

    /// Destroy a session's state.
    pub async fn end_session(&self, session_id: &str) -> bool {
        self.registry.end(session_id).await
    }

    /// Run one turn.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        prompt: &str,
        requested_language: Option<Language>,
    ) -> Result<TurnOutput, InferenceError> {
        let intent = classify(prompt);
        let handle = self.registry.get_or_create(session_id).await;
        let mut state = handle.lock().await;

        match resolve(&intent, &state, requested_language) {
            Resolution::NonEmotional { hard_reset } => {
                if hard_reset {
                    debug!(session = %session_id, "left the emotional path; hard reset");
                    state.hard_reset();
                }
                drop(state);
                self.non_emotional_turn(&intent, prompt, requested_language)
                    .await
            }
            Resolution::Emotional(voice) => self.emotional_turn(&mut state, &intent, &voice, prompt),
        }
    }

    async fn non_emotional_turn(
        &self,
        intent: &Intent,
        prompt: &str,
        requested_language: Option<Language>,
    ) -> Result<TurnOutput, InferenceError> {
        let response_text = match intent.kind {
            IntentKind::Refusal => REFUSAL_TEXT.to_string(),
            _ => self.model.generate(prompt).await.map_err(|err| {
                error!(error = %err, backend = self.model.name(), "generative backend failed");
                InferenceError
            })?,
        };

        let language = requested_language.unwrap_or(Language::En);
        let replay = replay_hash(&ReplayInputs {
            prompt,
            emotional_lang: language.as_str(),
            guardrail_category: "none",
            guardrail_severity: "none",
            skeleton: None,
            tone_profile: None,
            selection: &[],
        })
        .map_err(|err| {
            error!(error = %err, "replay hash derivation failed");
            InferenceError
        })?;

        Ok(TurnOutput {
            response_text,
            trace: Trace {
                turn: None,
                guardrail: GuardrailTrace::none(),
                skeleton: None,
                tone_profile: None,
                selection: BTreeMap::new(),
                replay_hash: replay,
                meta: None,
            },
        })
    }

    fn emotional_turn(
        &self,
        state: &mut SessionVoiceState,
        intent: &Intent,
        voice: &ResolvedVoice,
        prompt: &str,
    ) -> Result<TurnOutput, InferenceError> {
        let mut draft = state.clone();
        apply_resets(&mut draft, &voice.resets);

        let ctx = TurnContext {
            skeleton: voice.skeleton,
            language: voice.language,
            escalation_state: voice.escalation_state,
            latched_theme: voice.latched_theme,
            emotional_turn_index: draft.emotional_turn_index,
        };

        let (sections, assembled, meta) = if let Some(err) = invalid_transition(state, voice) {
            self.fallback_turn(state, &mut draft, voice, &ctx, err)
        } else if let Some(store) = &self.contract {
            match self.select_all(store, &mut draft, &ctx) {
                Ok((sections, meta)) => match assemble(&sections) {
                    Ok(text) => (sections, text, meta),
                    Err(err) => self.fallback_turn(
                        state,
                        &mut draft,
                        voice,
                        &ctx,
                        VoiceError::Assembly(err),
                    ),
                },
                Err(err) => self.fallback_turn(state, &mut draft, voice, &ctx, err),
            }
        } else {
            let plan = plan_fallback(None, ctx.skeleton, ctx.language, FallbackLevel::Absolute);
            let meta = FallbackMeta {
                fallback_reason: FallbackReason::ContractLoadFailure,
                fallback_level: plan.level,
            };
            (plan.sections, plan.text, Some(meta))
        };

        let verdict = evaluate_guardrail(self.contract.as_ref(), intent, ctx.language);
        let response_text = verdict.replacement_text.clone().unwrap_or(assembled);

        let selection_pairs: Vec<(Section, u32)> = sections
            .iter()
            .map(|selected| (selected.section, selected.variant_id))
            .collect();
        let tone = tone_profile(ctx.skeleton);

        let replay = replay_hash(&ReplayInputs {
            prompt,
            emotional_lang: ctx.language.as_str(),
            guardrail_category: &verdict.trace.category,
            guardrail_severity: &verdict.trace.severity,
            skeleton: Some(ctx.skeleton.as_str()),
            tone_profile: Some(tone),
            selection: &selection_pairs,
        })
        .map_err(|err| {
            error!(error = %err, "replay hash derivation failed");
            InferenceError
        })?;

        let trace = Trace {
            turn: Some(ctx.emotional_turn_index),
            guardrail: verdict.trace,
            skeleton: Some(ctx.skeleton),
            tone_profile: Some(tone.to_string()),
            selection: selection_pairs.into_iter().collect(),
            replay_hash: replay,
            meta,
        };

        // Single atomic commit.  Absolute fallbacks leave the live state
        // untouched: no rotation writes, no turn-index increment.
        let absolute = matches!(
            meta,
            Some(FallbackMeta {
                fallback_level: FallbackLevel::Absolute,
                ..
            })
        );
        if !absolute {
            draft.emotional_turn_index += 1;
            draft.last_skeleton = Some(ctx.skeleton);
            draft.last_language = Some(ctx.language);
            draft.escalation_state = voice.escalation_state;
            draft.latched_theme = voice.latched_theme;
            *state = draft;
        }

        Ok(TurnOutput {
            response_text,
            trace,
        })
    }

    /// Select every section of the skeleton, with the single permitted
    /// re-selection after clearing an inconsistent pool.
    fn select_all(
        &self,
        store: &ContractStore,
        draft: &mut SessionVoiceState,
        ctx: &TurnContext,
    ) -> Result<(Vec<SelectedVariant>, Option<FallbackMeta>), VoiceError> {
        let mut meta: Option<FallbackMeta> = None;
        let mut sections = Vec::new();

        for &section in ctx.skeleton.policy().sections {
            let selected = match select_variant(store, &mut draft.rotation, ctx, section) {
                Ok(selected) => selected,
                Err(SelectionError::RotationInconsistent { pool, .. }) => {
                    warn!(%pool, "rotation memory inconsistent; clearing pool and reselecting");
                    draft.rotation.clear_pools(|key| *key == pool);
                    meta = Some(FallbackMeta {
                        fallback_reason: FallbackReason::RotationMemoryReset,
                        fallback_level: FallbackLevel::SkeletonLocal,
                    });
                    select_variant(store, &mut draft.rotation, ctx, section)?
                }
                Err(err) => return Err(err.into()),
            };
            if selected.exhausted && meta.is_none() {
                meta = Some(FallbackMeta {
                    fallback_reason: FallbackReason::SelectionExhausted,
                    fallback_level: FallbackLevel::SkeletonLocal,
                });
            }
            sections.push(selected);
        }

        Ok((sections, meta))
    }

    /// Rebuild the working state from scratch and resolve the fallback
    /// hierarchy; partial selections from the failed attempt are discarded.
    fn fallback_turn(
        &self,
        base: &SessionVoiceState,
        draft: &mut SessionVoiceState,
        voice: &ResolvedVoice,
        ctx: &TurnContext,
        err: VoiceError,
    ) -> (Vec<SelectedVariant>, String, Option<FallbackMeta>) {
        warn!(error = %err, skeleton = %ctx.skeleton, "voice pipeline fallback");

        *draft = base.clone();
        apply_resets(draft, &voice.resets);

        let plan = plan_fallback(
            self.contract.as_ref(),
            ctx.skeleton,
            ctx.language,
            err.entry_level(),
        );
        if plan.commits_state() {
            for selected in &plan.sections {
                draft.rotation.append(
                    ctx.pool_key(selected.section),
                    VariantUsage {
                        variant_id: selected.variant_id,
                        emotional_turn_index: ctx.emotional_turn_index,
                    },
                );
            }
        }

        let meta = FallbackMeta {
            fallback_reason: err.fallback_reason(),
            fallback_level: plan.level,
        };
        (plan.sections, plan.text, Some(meta))
    }
}

/// E3 guard: the escalation ladder never steps down outside the full-reset
/// path.  The resolver upholds this by construction; a violation means the
/// session state itself is no longer trustworthy.
fn invalid_transition(state: &SessionVoiceState, voice: &ResolvedVoice) -> Option<VoiceError> {
    let previous = state.last_skeleton?;
    let ladder = |s: Skeleton| s != Skeleton::D;
    let stepped_down = ladder(previous)
        && ladder(voice.skeleton)
        && voice.skeleton.escalation_rank() < previous.escalation_rank()
        && !voice.resets.contains(&ResetDirective::Hard);
    stepped_down.then(|| {
        VoiceError::State(StateError::InvalidTransition {
            from: Some(previous),
            to: voice.skeleton,
        })
    })
}

fn apply_resets(state: &mut SessionVoiceState, resets: &[ResetDirective]) {
    for reset in resets {
        match reset {
            ResetDirective::Hard => state.hard_reset(),
            ResetDirective::SkeletonPools(skeleton) => {
                state.clear_skeleton_pools(*skeleton);
            }
            ResetDirective::ThemePools(theme) => {
                state.clear_theme_pools(*theme);
            }
            ResetDirective::LanguagePools(language) => {
                state.clear_language_pools(*language);
            }
        }
    }
}
