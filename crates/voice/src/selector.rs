//! Deterministic variant selection.
//!
//! A fixed five-phase pipeline per section: eligibility, hard constraints,
//! usage scoring, tie-break, commit.  Each phase only reduces or orders the
//! candidate set.  The selector is a total function of the contract, the
//! rotation memory, and the turn context; it never sees user text.

use tracing::trace;

use desi_contract::{
    ContractStore, Language, PoolKey, Section, Skeleton, SkeletonPolicy, Theme, VariantEntry,
    VariantTag,
};
use desi_session::{EscalationState, RotationMemory, VariantUsage};

use crate::error::SelectionError;

/// Immutable snapshot handed from the resolver to the selector.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext {
    pub skeleton: Skeleton,
    pub language: Language,
    pub escalation_state: EscalationState,
    pub latched_theme: Option<Theme>,
    pub emotional_turn_index: u64,
}

impl TurnContext {
    pub fn pool_key(&self, section: Section) -> PoolKey {
        PoolKey::new(self.skeleton, self.language, section)
    }
}

/// One chosen variant, already committed to rotation memory.
#[derive(Debug, Clone)]
pub struct SelectedVariant {
    pub section: Section,
    pub variant_id: u32,
    pub text: String,
    /// Hard constraints emptied the pool and the stable variant-0 failure
    /// path was taken.  Surfaces as `selection_exhausted` in the trace.
    pub exhausted: bool,
}

/// Select one variant for `section` and commit its usage.
///
/// `rotation` is the turn's working copy of the session's rotation memory;
/// the append here becomes durable only when the whole turn commits.
pub fn select_variant(
    contract: &ContractStore,
    rotation: &mut RotationMemory,
    ctx: &TurnContext,
    section: Section,
) -> Result<SelectedVariant, SelectionError> {
    let key = ctx.pool_key(section);
    let pool = contract.variants(ctx.skeleton, ctx.language, section);
    if pool.is_empty() {
        return Err(SelectionError::EmptyPool(key));
    }

    // Windows may only reference ids inside the pool; anything else means
    // the rotation memory has drifted from the contract.
    if let Some(bad) = rotation
        .window(key)
        .iter()
        .find(|usage| usage.variant_id as usize >= pool.len())
    {
        return Err(SelectionError::RotationInconsistent {
            pool: key,
            variant_id: bad.variant_id,
            len: pool.len(),
        });
    }

    let policy = ctx.skeleton.policy();

    // Phase 1: eligibility.  Fixed single-entry slots return immediately.
    if is_fixed_slot(ctx.skeleton, section) {
        return Ok(commit(rotation, ctx, key, section, &pool[0], false));
    }

    let mut candidates: Vec<&VariantEntry> = pool.iter().collect();
    if policy.restrict_expansion_variants {
        candidates.retain(|entry| !entry.has_tag(VariantTag::AddedViaExpansion));
    }

    // Phase 2: hard constraints.
    let last_used = rotation.last_used(key);

    // Escalation constraints.
    if ctx.escalation_state == EscalationState::Latched {
        candidates.retain(|entry| !entry.has_tag(VariantTag::Light));
    }
    if ctx.skeleton == Skeleton::C {
        let previous_was_high_activity = last_used
            .and_then(|usage| contract.entry(key, usage.variant_id))
            .map(|entry| entry.has_tag(VariantTag::HighActivity))
            .unwrap_or(true);
        if !previous_was_high_activity {
            candidates.retain(|entry| !entry.has_tag(VariantTag::HighActivity));
        }
    }

    // Theme constraints.
    if ctx.latched_theme == Some(Theme::Family) {
        candidates.retain(|entry| entry.has_tag(VariantTag::FamilySafe));
    }

    // No immediate repetition, provided alternatives remain among the
    // entries that survived the filters above.
    if let Some(last) = last_used {
        let without: Vec<&VariantEntry> = candidates
            .iter()
            .copied()
            .filter(|entry| entry.variant_id != last.variant_id)
            .collect();
        if !without.is_empty() {
            candidates = without;
        }
    }

    // Zero candidates: C restores its last variant, everyone else takes the
    // stable variant-0 failure.
    if candidates.is_empty() {
        if policy.repeat_on_exhaustion {
            let entry = last_used
                .and_then(|usage| contract.entry(key, usage.variant_id))
                .unwrap_or(&pool[0]);
            return Ok(commit(rotation, ctx, key, section, entry, false));
        }
        return Ok(commit(rotation, ctx, key, section, &pool[0], true));
    }

    // Phase 3: usage scoring.
    let window = rotation.window(key);
    let skip_scoring = policy.skip_first_turn_scoring && ctx.emotional_turn_index == 0;
    let scored: Vec<(i64, &VariantEntry)> = candidates
        .into_iter()
        .map(|entry| {
            let score = if skip_scoring {
                0
            } else {
                usage_score(entry.variant_id, window, policy.window_size, policy)
            };
            trace!(pool = %key, variant = entry.variant_id, score, "scored candidate");
            (score, entry)
        })
        .collect();

    // Phase 4: tie-break.  Max score, then least recently used (never-used
    // first), then lowest window usage count, then lowest variant id.
    let chosen = scored
        .iter()
        .min_by_key(|(score, entry)| {
            let last_pos = window
                .iter()
                .rposition(|usage| usage.variant_id == entry.variant_id)
                .map(|p| p as i64)
                .unwrap_or(-1);
            let count = window
                .iter()
                .filter(|usage| usage.variant_id == entry.variant_id)
                .count();
            (-score, last_pos, count, entry.variant_id)
        })
        .map(|(_, entry)| *entry)
        .expect("candidate set is non-empty");

    // Phase 5: commit.
    Ok(commit(rotation, ctx, key, section, chosen, false))
}

/// Slots with exactly one legal entry: closures under A/C/D and the D
/// opener.
fn is_fixed_slot(skeleton: Skeleton, section: Section) -> bool {
    match section {
        Section::Closure => matches!(skeleton, Skeleton::A | Skeleton::C | Skeleton::D),
        Section::Opener => skeleton == Skeleton::D,
        _ => false,
    }
}

/// Distance-weighted usage penalty over the rolling window.
fn usage_score(
    variant_id: u32,
    window: &[VariantUsage],
    window_size: usize,
    policy: &SkeletonPolicy,
) -> i64 {
    let n = window.len();
    let mut score: i64 = 0;

    let mut count: usize = 0;
    for (idx, usage) in window.iter().enumerate() {
        if usage.variant_id != variant_id {
            continue;
        }
        count += 1;
        // Distance from now: 1 = most recent entry.
        let d = (n - idx) as i64;
        score -= halved(window_size as i64 - d + 1, policy);
    }

    // Overuse penalty once a candidate dominates the window.
    if n > 0 && count * 100 > policy.overuse_threshold_pct as usize * n {
        score -= halved(2 * window_size as i64, policy);
    }

    score
}

/// Halve a penalty magnitude, flooring, where the policy says so.
fn halved(magnitude: i64, policy: &SkeletonPolicy) -> i64 {
    if policy.halve_penalties {
        magnitude / 2
    } else {
        magnitude
    }
}

fn commit(
    rotation: &mut RotationMemory,
    ctx: &TurnContext,
    key: PoolKey,
    section: Section,
    entry: &VariantEntry,
    exhausted: bool,
) -> SelectedVariant {
    rotation.append(
        key,
        VariantUsage {
            variant_id: entry.variant_id,
            emotional_turn_index: ctx.emotional_turn_index,
        },
    );
    SelectedVariant {
        section,
        variant_id: entry.variant_id,
        text: entry.text.clone(),
        exhausted,
    }
}
