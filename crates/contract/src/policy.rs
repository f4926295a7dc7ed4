//! Per-skeleton behavior table.
//!
//! Everything that varies by skeleton (permitted sections, rotation window,
//! scoring adjustments) lives here as plain data keyed by the tag, so the
//! selector and session layers stay free of per-skeleton conditionals.

use crate::schema::{Section, Skeleton};

#[derive(Debug, Clone, Copy)]
pub struct SkeletonPolicy {
    /// Number of trailing usage entries that count when reading a pool.
    pub window_size: usize,
    /// Sections assembled for this skeleton, in emission order.
    pub sections: &'static [Section],
    /// Window-share above which the overuse penalty fires (percent).
    pub overuse_threshold_pct: u8,
    /// Halve every scoring penalty magnitude (flooring) before applying.
    pub halve_penalties: bool,
    /// Skip usage scoring entirely on the session's first emotional turn.
    pub skip_first_turn_scoring: bool,
    /// When hard constraints empty the candidate set, restore the last-used
    /// variant instead of falling back to variant 0.
    pub repeat_on_exhaustion: bool,
    /// Drop variants tagged `added_via_expansion` unless explicitly approved.
    pub restrict_expansion_variants: bool,
}

const POLICY_A: SkeletonPolicy = SkeletonPolicy {
    window_size: 6,
    sections: &[Section::Opener, Section::Validation, Section::Closure],
    overuse_threshold_pct: 50,
    halve_penalties: false,
    skip_first_turn_scoring: true,
    repeat_on_exhaustion: false,
    restrict_expansion_variants: false,
};

const POLICY_B: SkeletonPolicy = SkeletonPolicy {
    window_size: 8,
    sections: &[Section::Opener, Section::Validation, Section::Closure],
    overuse_threshold_pct: 50,
    halve_penalties: false,
    skip_first_turn_scoring: false,
    repeat_on_exhaustion: false,
    restrict_expansion_variants: false,
};

const POLICY_C: SkeletonPolicy = SkeletonPolicy {
    window_size: 3,
    sections: &[Section::Opener, Section::Validation, Section::Closure],
    overuse_threshold_pct: 80,
    halve_penalties: true,
    skip_first_turn_scoring: false,
    repeat_on_exhaustion: true,
    restrict_expansion_variants: true,
};

const POLICY_D: SkeletonPolicy = SkeletonPolicy {
    window_size: 4,
    sections: &[Section::Opener, Section::Action, Section::Closure],
    overuse_threshold_pct: 50,
    halve_penalties: false,
    skip_first_turn_scoring: false,
    repeat_on_exhaustion: false,
    restrict_expansion_variants: false,
};

impl Skeleton {
    pub fn policy(self) -> &'static SkeletonPolicy {
        match self {
            Skeleton::A => &POLICY_A,
            Skeleton::B => &POLICY_B,
            Skeleton::C => &POLICY_C,
            Skeleton::D => &POLICY_D,
        }
    }

    /// Whether `section` is legal under this skeleton at all.
    pub fn allows_section(self, section: Section) -> bool {
        self.policy().sections.contains(&section)
    }
}
