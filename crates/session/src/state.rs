//! Per-session voice state: rotation memory, escalation, latched theme.
//!
//! All mutability in the engine lives here.  A turn never mutates the live
//! state directly: the runtime clones it, works the clone through the whole
//! pipeline, and swaps it back in one assignment once the turn has fully
//! succeeded.  An abandoned or failed turn leaves the live state untouched.

use std::collections::HashMap;

use desi_contract::{Language, PoolKey, Skeleton, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    None,
    Escalating,
    Latched,
}

/// One committed variant pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantUsage {
    pub variant_id: u32,
    pub emotional_turn_index: u64,
}

/// Append-only usage log for one pool, windowed on read.
///
/// The full history is kept up to a small multiple of the window so the
/// append path stays O(1); readers only ever see the trailing
/// `window_size` entries.
#[derive(Debug, Clone)]
pub struct VariantUsageWindow {
    window_size: usize,
    history: Vec<VariantUsage>,
}

impl VariantUsageWindow {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            history: Vec::new(),
        }
    }

    pub fn append(&mut self, usage: VariantUsage) {
        self.history.push(usage);
        // Bound retained history; the logical window never exceeds this.
        let cap = self.window_size.saturating_mul(4).max(1);
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(..excess);
        }
    }

    /// The trailing `window_size` entries, oldest first.
    pub fn window(&self) -> &[VariantUsage] {
        let len = self.history.len();
        let start = len.saturating_sub(self.window_size);
        &self.history[start..]
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn last(&self) -> Option<&VariantUsage> {
        self.history.last()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Rotation memory: one usage window per pool, fully independent pools.
#[derive(Debug, Clone, Default)]
pub struct RotationMemory {
    pools: HashMap<PoolKey, VariantUsageWindow>,
}

impl RotationMemory {
    /// The logical window for `key`; empty when the pool was never used.
    pub fn window(&self, key: PoolKey) -> &[VariantUsage] {
        self.pools.get(&key).map(|w| w.window()).unwrap_or(&[])
    }

    /// The variant committed by the immediately preceding emotional turn
    /// that touched this pool.
    pub fn last_used(&self, key: PoolKey) -> Option<VariantUsage> {
        self.pools.get(&key).and_then(|w| w.last()).copied()
    }

    pub fn append(&mut self, key: PoolKey, usage: VariantUsage) {
        self.pools
            .entry(key)
            .or_insert_with(|| VariantUsageWindow::new(key.skeleton.policy().window_size))
            .append(usage);
    }

    pub fn clear(&mut self) {
        self.pools.clear();
    }

    /// Drop every pool matching `predicate`.  Returns how many were cleared.
    pub fn clear_pools(&mut self, predicate: impl Fn(&PoolKey) -> bool) -> usize {
        let before = self.pools.len();
        self.pools.retain(|key, _| !predicate(key));
        before - self.pools.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

/// The whole mutable surface of one session.
#[derive(Debug, Clone)]
pub struct SessionVoiceState {
    pub rotation: RotationMemory,
    pub escalation_state: EscalationState,
    pub latched_theme: Option<Theme>,
    pub emotional_turn_index: u64,
    pub last_skeleton: Option<Skeleton>,
    /// Language of the previous emotional turn; a change clears the new
    /// language's pools.
    pub last_language: Option<Language>,
}

impl Default for SessionVoiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionVoiceState {
    pub fn new() -> Self {
        Self {
            rotation: RotationMemory::default(),
            escalation_state: EscalationState::None,
            latched_theme: None,
            emotional_turn_index: 0,
            last_skeleton: None,
            last_language: None,
        }
    }

    /// Full reset: rotation memory gone, clocks and latches back to zero.
    /// Fires on emotional->non-emotional transition, session end, C->A
    /// resolution, or an explicit reset.
    pub fn hard_reset(&mut self) {
        self.rotation.clear();
        self.escalation_state = EscalationState::None;
        self.latched_theme = None;
        self.emotional_turn_index = 0;
        self.last_skeleton = None;
        self.last_language = None;
    }

    /// Clear the pools of one skeleton (upward-escalation reset).
    pub fn clear_skeleton_pools(&mut self, skeleton: Skeleton) -> usize {
        self.rotation.clear_pools(|key| key.skeleton == skeleton)
    }

    /// Clear the pools of one language (language-change reset).
    pub fn clear_language_pools(&mut self, language: Language) -> usize {
        self.rotation.clear_pools(|key| key.language == language)
    }

    /// Clear the pools of the skeletons a theme constrains.  A latched
    /// `family` theme affects B and C, the only skeletons it may resolve to.
    pub fn clear_theme_pools(&mut self, theme: Theme) -> usize {
        let affected: &[Skeleton] = match theme {
            Theme::Family => &[Skeleton::B, Skeleton::C],
            Theme::Resignation => &[Skeleton::C],
            Theme::Other => &[],
        };
        self.rotation
            .clear_pools(|key| affected.contains(&key.skeleton))
    }
}
