//! Immutable indexed view over a validated contract document.
//!
//! Loaded once at process start, read-only afterwards.  A store is never
//! constructed from a document that fails validation, so every reader can
//! trust the contract invariants without re-checking them.

use std::collections::HashMap;
use std::path::Path;

use crate::document::ContractDocument;
use crate::schema::{Language, PoolKey, Section, Skeleton, VariantEntry};
use crate::{ContractError, EMBEDDED_CONTRACT_JSON};

/// Contract version the running engine understands.  A document carrying any
/// other version is rejected at load time.
pub const CONTRACT_VERSION: &str = "1.0.0";

/// Tokens of the advice lexicon.  Forbidden everywhere outside skeleton D.
pub const ADVICE_TOKENS: &[&str] = &["should", "try", "best way"];

/// Returns the first advice token found in `text`, if any.  Single-word
/// tokens match on word boundaries; multi-word tokens match as a phrase on
/// the normalized text.
pub fn find_advice_token(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let joined = words.join(" ");

    for &token in ADVICE_TOKENS {
        let hit = if token.contains(' ') {
            joined.contains(token)
        } else {
            words.contains(&token)
        };
        if hit {
            return Some(token);
        }
    }
    None
}

/// Maximum pool sizes per section.
fn section_limit(section: Section) -> Option<usize> {
    match section {
        Section::Opener => Some(3),
        Section::Validation => Some(4),
        Section::Closure | Section::Action => None,
    }
}

/// Skeletons whose closure pool must hold exactly one entry.
fn closure_is_singular(skeleton: Skeleton) -> bool {
    matches!(skeleton, Skeleton::A | Skeleton::C | Skeleton::D)
}

#[derive(Debug)]
pub struct ContractStore {
    pools: HashMap<PoolKey, Vec<VariantEntry>>,
    version: String,
}

impl ContractStore {
    /// Validate `document` and index it.  Any violation fails the whole load;
    /// the store never serves a partial contract.
    pub fn from_document(document: ContractDocument) -> Result<Self, ContractError> {
        if document.contract_version != CONTRACT_VERSION {
            return Err(ContractError::VersionMismatch {
                expected: CONTRACT_VERSION.to_string(),
                found: document.contract_version,
            });
        }

        let mut pools: HashMap<PoolKey, Vec<VariantEntry>> = HashMap::new();
        for pool in document.pools {
            let key = PoolKey::new(pool.skeleton, pool.language, pool.section);
            if pools.contains_key(&key) {
                return Err(ContractError::DuplicatePool(key));
            }

            let entries: Vec<VariantEntry> = pool
                .variants
                .into_iter()
                .enumerate()
                .map(|(idx, variant)| VariantEntry {
                    variant_id: idx as u32,
                    text: variant.text,
                    tags: variant.tags,
                })
                .collect();
            pools.insert(key, entries);
        }

        let store = Self {
            pools,
            version: CONTRACT_VERSION.to_string(),
        };
        store.validate()?;
        Ok(store)
    }

    /// Load and validate the contract compiled into the binary.
    pub fn load_embedded() -> Result<Self, ContractError> {
        Self::from_document(ContractDocument::from_json(EMBEDDED_CONTRACT_JSON)?)
    }

    /// Load and validate a contract document from `path`.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        Self::from_document(ContractDocument::from_file(path)?)
    }

    fn validate(&self) -> Result<(), ContractError> {
        for (key, entries) in &self.pools {
            if entries.is_empty() {
                return Err(ContractError::EmptyPool(*key));
            }

            if key.section == Section::Action && key.skeleton != Skeleton::D {
                return Err(ContractError::ActionOutsideD(*key));
            }
            if !key.skeleton.allows_section(key.section) {
                return Err(ContractError::SectionNotLegal(*key));
            }

            if let Some(limit) = section_limit(key.section) {
                if entries.len() > limit {
                    return Err(ContractError::PoolTooLarge {
                        key: *key,
                        found: entries.len(),
                        limit,
                    });
                }
            }

            if key.section == Section::Closure
                && closure_is_singular(key.skeleton)
                && entries.len() != 1
            {
                return Err(ContractError::ClosureCardinality {
                    key: *key,
                    found: entries.len(),
                });
            }

            if key.skeleton != Skeleton::D {
                for entry in entries {
                    if let Some(token) = find_advice_token(&entry.text) {
                        return Err(ContractError::AdviceTokenOutsideD {
                            key: *key,
                            token: token.to_string(),
                        });
                    }
                }
            }
        }

        // Every skeleton must carry its full English section set.
        for skeleton in Skeleton::ALL {
            for &section in skeleton.policy().sections {
                let key = PoolKey::new(skeleton, Language::En, section);
                if !self.pools.contains_key(&key) {
                    return Err(ContractError::MissingPool(key));
                }
            }
        }

        Ok(())
    }

    /// Ordered variant list for a pool; empty when the pool is absent.
    pub fn variants(&self, skeleton: Skeleton, language: Language, section: Section) -> &[VariantEntry] {
        self.pools
            .get(&PoolKey::new(skeleton, language, section))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has(&self, skeleton: Skeleton, language: Language, section: Section) -> bool {
        !self.variants(skeleton, language, section).is_empty()
    }

    pub fn entry(&self, key: PoolKey, variant_id: u32) -> Option<&VariantEntry> {
        self.pools
            .get(&key)
            .and_then(|entries| entries.get(variant_id as usize))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Total variant count across all pools.
    pub fn variant_count(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PoolDocument, VariantDocument};
    use std::collections::BTreeSet;

    fn variant(text: &str) -> VariantDocument {
        VariantDocument {
            text: text.to_string(),
            tags: BTreeSet::new(),
        }
    }

    fn pool(
        skeleton: Skeleton,
        language: Language,
        section: Section,
        texts: &[&str],
    ) -> PoolDocument {
        PoolDocument {
            skeleton,
            language,
            section,
            variants: texts.iter().map(|t| variant(t)).collect(),
        }
    }

    fn minimal_document() -> ContractDocument {
        let mut pools = Vec::new();
        for skeleton in Skeleton::ALL {
            for &section in skeleton.policy().sections {
                pools.push(pool(skeleton, Language::En, section, &["only entry"]));
            }
        }
        ContractDocument {
            contract_version: CONTRACT_VERSION.to_string(),
            pools,
        }
    }

    #[test]
    fn embedded_contract_loads_and_validates() {
        let store = ContractStore::load_embedded().unwrap();
        assert_eq!(store.version(), CONTRACT_VERSION);
        assert!(store.has(Skeleton::A, Language::En, Section::Opener));
        assert!(store.has(Skeleton::D, Language::Hi, Section::Action));
        assert!(!store.has(Skeleton::A, Language::En, Section::Action));
    }

    #[test]
    fn embedded_scenario_texts_are_stable() {
        let store = ContractStore::load_embedded().unwrap();
        let opener = store.variants(Skeleton::A, Language::En, Section::Opener);
        assert_eq!(opener[0].text, "That sounds really heavy.");
        let validation = store.variants(Skeleton::A, Language::En, Section::Validation);
        assert_eq!(validation[0].text, "It makes sense you feel this way.");
        let closure = store.variants(Skeleton::A, Language::En, Section::Closure);
        assert_eq!(closure[0].text, "If you want, you can tell me more.");
    }

    #[test]
    fn variant_ids_are_positional() {
        let store = ContractStore::load_embedded().unwrap();
        for skeleton in Skeleton::ALL {
            for &section in skeleton.policy().sections {
                for (idx, entry) in store
                    .variants(skeleton, Language::En, section)
                    .iter()
                    .enumerate()
                {
                    assert_eq!(entry.variant_id as usize, idx);
                }
            }
        }
    }

    #[test]
    fn version_mismatch_is_a_hard_failure() {
        let mut doc = minimal_document();
        doc.contract_version = "0.9.0".to_string();
        let err = ContractStore::from_document(doc).unwrap_err();
        assert!(matches!(err, ContractError::VersionMismatch { .. }));
    }

    #[test]
    fn missing_english_pool_fails_load() {
        let mut doc = minimal_document();
        doc.pools
            .retain(|p| !(p.skeleton == Skeleton::B && p.section == Section::Closure));
        let err = ContractStore::from_document(doc).unwrap_err();
        assert!(matches!(err, ContractError::MissingPool(_)));
    }

    #[test]
    fn oversized_opener_pool_fails_load() {
        let mut doc = minimal_document();
        doc.pools.push(pool(
            Skeleton::B,
            Language::Hi,
            Section::Opener,
            &["one", "two", "three", "four"],
        ));
        let err = ContractStore::from_document(doc).unwrap_err();
        assert!(matches!(err, ContractError::PoolTooLarge { .. }));
    }

    #[test]
    fn plural_closure_under_a_fails_load() {
        let mut doc = minimal_document();
        for p in &mut doc.pools {
            if p.skeleton == Skeleton::A && p.section == Section::Closure {
                p.variants.push(variant("a second closure"));
            }
        }
        let err = ContractStore::from_document(doc).unwrap_err();
        assert!(matches!(err, ContractError::ClosureCardinality { .. }));
    }

    #[test]
    fn advice_token_outside_d_fails_load() {
        let mut doc = minimal_document();
        for p in &mut doc.pools {
            if p.skeleton == Skeleton::B && p.section == Section::Validation {
                p.variants[0] = variant("Maybe you should rest.");
            }
        }
        let err = ContractStore::from_document(doc).unwrap_err();
        assert!(matches!(err, ContractError::AdviceTokenOutsideD { .. }));
    }

    #[test]
    fn action_pool_outside_d_fails_load() {
        let mut doc = minimal_document();
        doc.pools
            .push(pool(Skeleton::B, Language::En, Section::Action, &["move"]));
        let err = ContractStore::from_document(doc).unwrap_err();
        assert!(matches!(err, ContractError::ActionOutsideD(_)));
    }

    #[test]
    fn advice_lexicon_matches_whole_words_only() {
        assert_eq!(find_advice_token("the country side"), None);
        assert_eq!(find_advice_token("you should rest"), Some("should"));
        assert_eq!(find_advice_token("Try it"), Some("try"));
        assert_eq!(find_advice_token("the best way forward"), Some("best way"));
        // "trying" must not match the "try" token.
        assert_eq!(find_advice_token("trying times"), None);
    }

    #[test]
    fn embedded_contract_has_no_advice_tokens_outside_d() {
        let store = ContractStore::load_embedded().unwrap();
        for skeleton in [Skeleton::A, Skeleton::B, Skeleton::C] {
            for language in Language::ALL {
                for &section in skeleton.policy().sections {
                    for entry in store.variants(skeleton, language, section) {
                        assert_eq!(
                            find_advice_token(&entry.text),
                            None,
                            "advice token in {skeleton}/{language}/{section}: {}",
                            entry.text
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn file_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.json");
        std::fs::write(&path, EMBEDDED_CONTRACT_JSON).unwrap();

        let store = ContractStore::load_file(&path).unwrap();
        assert_eq!(store.pool_count(), ContractStore::load_embedded().unwrap().pool_count());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        assert!(ContractStore::load_file("/nonexistent/contract.json").is_err());
    }
}
