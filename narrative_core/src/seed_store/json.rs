//! JSON-file seed store: one versioned file per campaign.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::{SeedStore, SeedStoreError};
use crate::foreshadowing::{CampaignId, ForeshadowingSeed, SeedId, SeedPatch};

/// Current seed file version.
pub const SEED_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SeedFile {
    version: u32,
    campaign: CampaignId,
    seeds: Vec<ForeshadowingSeed>,
}

/// Stores each campaign's seeds in `<dir>/<campaign>.seeds.json`.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonSeedStore {
    dir: PathBuf,
}

impl JsonSeedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, campaign: CampaignId) -> PathBuf {
        self.dir.join(format!("{}.seeds.json", campaign))
    }

    fn read(&self, campaign: CampaignId) -> Result<Vec<ForeshadowingSeed>, SeedStoreError> {
        let path = self.path_for(campaign);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let file: SeedFile = serde_json::from_str(&content)?;
        if file.version != SEED_FILE_VERSION {
            return Err(SeedStoreError::VersionMismatch {
                expected: SEED_FILE_VERSION,
                found: file.version,
            });
        }
        Ok(file.seeds)
    }

    fn write(
        &self,
        campaign: CampaignId,
        mut seeds: Vec<ForeshadowingSeed>,
    ) -> Result<(), SeedStoreError> {
        seeds.sort_by_key(|seed| seed.id.sequence);
        let file = SeedFile {
            version: SEED_FILE_VERSION,
            campaign,
            seeds,
        };

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(campaign);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl SeedStore for JsonSeedStore {
    fn save_seed(&mut self, seed: &ForeshadowingSeed) -> Result<(), SeedStoreError> {
        let mut seeds = self.read(seed.id.campaign)?;
        match seeds.iter_mut().find(|s| s.id == seed.id) {
            Some(existing) => *existing = seed.clone(),
            None => seeds.push(seed.clone()),
        }
        self.write(seed.id.campaign, seeds)
    }

    fn load_seeds(&self, campaign: CampaignId) -> Result<Vec<ForeshadowingSeed>, SeedStoreError> {
        let mut seeds = self.read(campaign)?;
        seeds.sort_by_key(|seed| seed.id.sequence);
        Ok(seeds)
    }

    fn update_seed(&mut self, id: &SeedId, patch: &SeedPatch) -> Result<(), SeedStoreError> {
        let mut seeds = self.read(id.campaign)?;
        let seed = seeds
            .iter_mut()
            .find(|s| s.id == *id)
            .ok_or(SeedStoreError::NotFound(*id))?;
        patch.apply_to(seed);
        self.write(id.campaign, seeds)
    }

    fn max_seed_sequence(&self, campaign: CampaignId) -> Result<u64, SeedStoreError> {
        Ok(self
            .read(campaign)?
            .iter()
            .map(|seed| seed.id.sequence)
            .max()
            .unwrap_or(0))
    }
}
