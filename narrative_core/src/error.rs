//! Error types for the narrative core.

use thiserror::Error;

use crate::foreshadowing::{CampaignId, SeedId, SeedStatus};
use crate::seed_store::SeedStoreError;

/// Errors from ledger operations.
///
/// Unknown seed ids are not errors by default; see
/// [`SeedMutation::require`](crate::foreshadowing::SeedMutation::require).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Seed store error: {0}")]
    Store(#[from] SeedStoreError),

    #[error("Seed not found: {0}")]
    SeedNotFound(SeedId),

    #[error("Seed {id} is already {status:?}")]
    SeedClosed { id: SeedId, status: SeedStatus },

    #[error("Seed {seed} does not belong to campaign {expected}")]
    CampaignMismatch { expected: CampaignId, seed: SeedId },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Text that is not a `seed-<sequence>@<campaign>` id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed seed id '{0}'")]
pub struct SeedIdParseError(pub String);

/// Errors loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
