//! Seed Store - the durability boundary for foreshadowing seeds.
//!
//! The store is also the only source of seed sequence numbers: a ledger asks
//! for the highest persisted sequence and plants the next one.

mod json;
mod memory;

pub use json::*;
pub use memory::*;

use thiserror::Error;

use crate::foreshadowing::{CampaignId, ForeshadowingSeed, SeedId, SeedPatch};

/// Errors from seed persistence.
#[derive(Debug, Error)]
pub enum SeedStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Seed not found: {0}")]
    NotFound(SeedId),

    #[error("Seed store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for seed records, keyed per campaign.
pub trait SeedStore {
    /// Insert or replace the record with the same id.
    fn save_seed(&mut self, seed: &ForeshadowingSeed) -> Result<(), SeedStoreError>;

    /// Every seed of `campaign`, in sequence order.
    fn load_seeds(&self, campaign: CampaignId) -> Result<Vec<ForeshadowingSeed>, SeedStoreError>;

    /// Apply a partial update to an existing record.
    fn update_seed(&mut self, id: &SeedId, patch: &SeedPatch) -> Result<(), SeedStoreError>;

    /// Highest sequence number persisted for `campaign`, or 0 when empty.
    fn max_seed_sequence(&self, campaign: CampaignId) -> Result<u64, SeedStoreError>;
}
