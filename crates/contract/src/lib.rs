//! Frozen catalogue of pre-approved response fragments.
//!
//! Everything the voice pipeline is allowed to say comes out of the contract
//! served by this crate.  The crate also owns the closed vocabulary types
//! (skeleton, language, section, tags) and the per-skeleton policy table the
//! rest of the pipeline keys its behavior on.

mod document;
mod policy;
mod schema;
mod store;

use thiserror::Error;

pub use document::{ContractDocument, PoolDocument, VariantDocument};
pub use policy::SkeletonPolicy;
pub use schema::{Language, PoolKey, Section, Skeleton, Theme, VariantEntry, VariantTag};
pub use store::{ADVICE_TOKENS, CONTRACT_VERSION, ContractStore, find_advice_token};

/// The v1 contract document compiled into the binary.  Served when no
/// contract path is configured; also the document CI pins its checks to.
pub const EMBEDDED_CONTRACT_JSON: &str = include_str!("../assets/voice_contract_v1.json");

/// Contract load failure (taxonomy E1).  Always fatal for the load as a
/// whole; the store never serves a partially valid contract.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("contract document unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("contract document malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("contract version {found} does not match engine contract version {expected}")]
    VersionMismatch { expected: String, found: String },
    #[error("duplicate pool {0}")]
    DuplicatePool(PoolKey),
    #[error("missing required pool {0}")]
    MissingPool(PoolKey),
    #[error("pool {0} holds no variants")]
    EmptyPool(PoolKey),
    #[error("pool {key} holds {found} variants, limit {limit}")]
    PoolTooLarge {
        key: PoolKey,
        found: usize,
        limit: usize,
    },
    #[error("pool {key} must hold exactly one closure variant, found {found}")]
    ClosureCardinality { key: PoolKey, found: usize },
    #[error("advice token {token:?} outside skeleton D in pool {key}")]
    AdviceTokenOutsideD { key: PoolKey, token: String },
    #[error("action pool {0} outside skeleton D")]
    ActionOutsideD(PoolKey),
    #[error("section not legal for skeleton in pool {0}")]
    SectionNotLegal(PoolKey),
}
