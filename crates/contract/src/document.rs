//! On-disk contract document.
//!
//! The contract is a static, version-controlled JSON document.  Variant ids
//! are not stored; they are the zero-based positions in each pool's ordered
//! `variants` array, which keeps the id assignment stable for as long as the
//! document only ever appends.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ContractError;
use crate::schema::{Language, Section, Skeleton, VariantTag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDocument {
    pub contract_version: String,
    pub pools: Vec<PoolDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDocument {
    pub skeleton: Skeleton,
    pub language: Language,
    pub section: Section,
    pub variants: Vec<VariantDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDocument {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<VariantTag>,
}

impl ContractDocument {
    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}
