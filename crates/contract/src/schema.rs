//! Core vocabulary shared by every stage of the voice pipeline.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Emotional response template.  Governs tone, permitted sections, and the
/// rotation window applied to its pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skeleton {
    /// Gentle acknowledgment.
    A,
    /// Grounded presence.
    B,
    /// Shared stillness.  Safety-critical register.
    C,
    /// Micro-action.  The only skeleton allowed to emit directive content.
    D,
}

impl Skeleton {
    pub const ALL: [Skeleton; 4] = [Skeleton::A, Skeleton::B, Skeleton::C, Skeleton::D];

    /// Escalation rank.  The ladder A -> B -> C is monotonic within a
    /// session; D sits outside the ladder and never escalates.
    pub fn escalation_rank(self) -> u8 {
        match self {
            Skeleton::A => 0,
            Skeleton::B => 1,
            Skeleton::C => 2,
            Skeleton::D => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Skeleton::A => "A",
            Skeleton::B => "B",
            Skeleton::C => "C",
            Skeleton::D => "D",
        }
    }
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hinglish,
    Hi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hinglish, Language::Hi];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hinglish => "hinglish",
            Language::Hi => "hi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named slot of a skeleton, filled by exactly one variant at assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Opener,
    Validation,
    Closure,
    Action,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Opener => "opener",
            Section::Validation => "validation",
            Section::Closure => "closure",
            Section::Action => "action",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sticky contextual theme detected from user text and latched onto the
/// session until a hard reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Family,
    Resignation,
    Other,
}

/// Marks a variant carries beyond its text.  `Light` and `HighActivity`
/// record the register/lexical-activity grade the escalation constraints
/// filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantTag {
    FamilySafe,
    AddedViaExpansion,
    Light,
    HighActivity,
}

/// A single pre-approved string, addressed by its stable zero-based index
/// into the pool's ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantEntry {
    pub variant_id: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<VariantTag>,
}

impl VariantEntry {
    pub fn has_tag(&self, tag: VariantTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Addresses one rotation pool.  Pools are fully independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub skeleton: Skeleton,
    pub language: Language,
    pub section: Section,
}

impl PoolKey {
    pub fn new(skeleton: Skeleton, language: Language, section: Section) -> Self {
        Self { skeleton, language, section }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.skeleton, self.language, self.section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_ladder_is_monotonic_a_b_c() {
        assert!(Skeleton::A.escalation_rank() < Skeleton::B.escalation_rank());
        assert!(Skeleton::B.escalation_rank() < Skeleton::C.escalation_rank());
    }

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Hinglish).unwrap(), "\"hinglish\"");
        assert_eq!(serde_json::to_string(&Section::Opener).unwrap(), "\"opener\"");
        assert_eq!(
            serde_json::to_string(&VariantTag::FamilySafe).unwrap(),
            "\"family_safe\""
        );
    }

    #[test]
    fn pool_key_display_is_slash_separated() {
        let key = PoolKey::new(Skeleton::A, Language::En, Section::Opener);
        assert_eq!(key.to_string(), "A/en/opener");
    }
}
