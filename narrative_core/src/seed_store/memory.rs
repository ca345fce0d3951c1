//! In-memory seed store for tests and throwaway games.

use std::collections::{BTreeMap, HashMap};

use super::{SeedStore, SeedStoreError};
use crate::foreshadowing::{CampaignId, ForeshadowingSeed, SeedId, SeedPatch};

#[derive(Debug, Clone, Default)]
pub struct InMemorySeedStore {
    campaigns: HashMap<CampaignId, BTreeMap<u64, ForeshadowingSeed>>,
}

impl InMemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of seeds stored for `campaign`.
    pub fn seed_count(&self, campaign: CampaignId) -> usize {
        self.campaigns.get(&campaign).map_or(0, BTreeMap::len)
    }

    pub fn get(&self, id: &SeedId) -> Option<&ForeshadowingSeed> {
        self.campaigns.get(&id.campaign)?.get(&id.sequence)
    }
}

impl SeedStore for InMemorySeedStore {
    fn save_seed(&mut self, seed: &ForeshadowingSeed) -> Result<(), SeedStoreError> {
        self.campaigns
            .entry(seed.id.campaign)
            .or_default()
            .insert(seed.id.sequence, seed.clone());
        Ok(())
    }

    fn load_seeds(&self, campaign: CampaignId) -> Result<Vec<ForeshadowingSeed>, SeedStoreError> {
        Ok(self
            .campaigns
            .get(&campaign)
            .map(|seeds| seeds.values().cloned().collect())
            .unwrap_or_default())
    }

    fn update_seed(&mut self, id: &SeedId, patch: &SeedPatch) -> Result<(), SeedStoreError> {
        let seed = self
            .campaigns
            .get_mut(&id.campaign)
            .and_then(|seeds| seeds.get_mut(&id.sequence))
            .ok_or(SeedStoreError::NotFound(*id))?;
        patch.apply_to(seed);
        Ok(())
    }

    fn max_seed_sequence(&self, campaign: CampaignId) -> Result<u64, SeedStoreError> {
        Ok(self
            .campaigns
            .get(&campaign)
            .and_then(|seeds| seeds.keys().next_back().copied())
            .unwrap_or(0))
    }
}
