//! Foreshadowing Ledger - tracks narrative seeds from planting to payoff.
//!
//! One ledger owns every seed of one campaign. Seeds are never removed; they
//! move through their lifecycle until resolved or abandoned. The seed store is
//! loaded in full when the ledger is opened and updated on every mutation,
//! before the in-memory copy changes.
//!
//! Seed ids often come from a generative process that may invent or repeat
//! them, so mutating an unknown id is not an error: it reports
//! [`SeedMutation::NotFound`] and changes nothing.

mod director;
mod seed;

pub use director::*;
pub use seed::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::seed_store::SeedStore;

/// Outcome of a mutating ledger call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMutation {
    Applied,
    /// No seed with that id in this campaign.
    NotFound,
    /// The seed is resolved or abandoned and was left unchanged.
    Closed(SeedStatus),
}

impl SeedMutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, SeedMutation::Applied)
    }

    /// Turn a tolerated no-op into an error, for callers that need the
    /// mutation to have happened.
    pub fn require(self, id: SeedId) -> Result<(), LedgerError> {
        match self {
            SeedMutation::Applied => Ok(()),
            SeedMutation::NotFound => Err(LedgerError::SeedNotFound(id)),
            SeedMutation::Closed(status) => Err(LedgerError::SeedClosed { id, status }),
        }
    }
}

/// Full serialized ledger state, for session export and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub campaign: CampaignId,
    pub seeds: Vec<ForeshadowingSeed>,
}

/// The seed collection of one campaign.
pub struct ForeshadowingLedger<S: SeedStore> {
    campaign: CampaignId,
    config: LedgerConfig,
    store: S,
    /// Seeds by sequence, which is also planting order.
    seeds: BTreeMap<u64, ForeshadowingSeed>,
}

impl<S: SeedStore> ForeshadowingLedger<S> {
    /// Open the ledger for `campaign`, loading every persisted seed.
    pub fn open(campaign: CampaignId, store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let seeds: BTreeMap<u64, ForeshadowingSeed> = store
            .load_seeds(campaign)?
            .into_iter()
            .filter(|seed| seed.id.campaign == campaign)
            .map(|seed| (seed.id.sequence, seed))
            .collect();
        debug!(%campaign, seeds = seeds.len(), "foreshadowing ledger opened");
        Ok(Self {
            campaign,
            config,
            store,
            seeds,
        })
    }

    /// Open with the default configuration.
    pub fn with_defaults(campaign: CampaignId, store: S) -> Result<Self, LedgerError> {
        Self::open(campaign, store, LedgerConfig::default())
    }

    pub fn campaign(&self) -> CampaignId {
        self.campaign
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn get_seed(&self, id: &SeedId) -> Option<&ForeshadowingSeed> {
        if id.campaign != self.campaign {
            return None;
        }
        self.seeds.get(&id.sequence)
    }

    /// All seeds in planting order.
    pub fn seeds(&self) -> impl Iterator<Item = &ForeshadowingSeed> {
        self.seeds.values()
    }

    /// Plant a new seed and return its id.
    ///
    /// The sequence number is always derived from the store's highest
    /// persisted sequence.
    pub fn plant_seed(&mut self, plan: SeedPlan) -> Result<SeedId, LedgerError> {
        let sequence = self.store.max_seed_sequence(self.campaign)? + 1;
        let id = SeedId::new(self.campaign, sequence);

        let seed = ForeshadowingSeed {
            id,
            seed_type: plan.seed_type,
            status: SeedStatus::Planted,
            description: plan.description,
            planted_narrative: truncate_chars(&plan.planted_narrative, self.config.narrative_limit),
            expected_payoff: plan.expected_payoff,
            planted_turn: plan.turn,
            planted_session: plan.session,
            min_turns_to_payoff: plan
                .min_turns_to_payoff
                .unwrap_or(self.config.default_min_turns_to_payoff),
            max_turns_to_payoff: plan
                .max_turns_to_payoff
                .unwrap_or(self.config.default_max_turns_to_payoff),
            mentions: 1,
            last_mentioned_turn: plan.turn,
            urgency: self.config.initial_urgency.clamp(0.0, 1.0),
            resolved_turn: None,
            resolution_narrative: None,
            tags: plan.tags,
            related_npcs: plan.related_npcs,
            related_locations: plan.related_locations,
            depends_on: plan.depends_on,
            triggers: plan.triggers,
            conflicts_with: plan.conflicts_with,
        };

        self.store.save_seed(&seed)?;
        info!(
            seed = %id,
            seed_type = seed.seed_type.name(),
            turn = seed.planted_turn,
            "seed planted"
        );
        self.seeds.insert(sequence, seed);
        Ok(id)
    }

    /// Persist `patch` for a live seed, then apply it in memory.
    fn mutate<F>(&mut self, id: &SeedId, build: F) -> Result<SeedMutation, LedgerError>
    where
        F: FnOnce(&ForeshadowingSeed) -> SeedPatch,
    {
        let Some(seed) = self.get_seed(id) else {
            debug!(seed = %id, "ignoring unknown seed");
            return Ok(SeedMutation::NotFound);
        };
        if seed.status.is_terminal() {
            debug!(seed = %id, status = ?seed.status, "ignoring closed seed");
            return Ok(SeedMutation::Closed(seed.status));
        }

        let patch = build(seed);
        self.store.update_seed(id, &patch)?;
        if let Some(seed) = self.seeds.get_mut(&id.sequence) {
            patch.apply_to(seed);
        }
        Ok(SeedMutation::Applied)
    }

    /// Record a mention: more momentum and urgency, and growth once a planted
    /// seed has been mentioned enough.
    pub fn mention_seed(&mut self, id: &SeedId, turn: u32) -> Result<SeedMutation, LedgerError> {
        let step = self.config.mention_urgency_step;
        let threshold = self.config.growing_mention_threshold;

        self.mutate(id, |seed| {
            let mentions = seed.mentions + 1;
            let grows = seed.status == SeedStatus::Planted && mentions >= threshold;
            if grows {
                info!(seed = %seed.id, mentions, "seed is growing");
            } else {
                debug!(seed = %seed.id, mentions, "seed mentioned");
            }
            SeedPatch {
                status: grows.then_some(SeedStatus::Growing),
                mentions: Some(mentions),
                last_mentioned_turn: Some(turn),
                urgency: Some((seed.urgency + step).clamp(0.0, 1.0)),
                ..Default::default()
            }
        })
    }

    /// Whether the seed is waiting and old enough to pay off. Unknown ids are
    /// never ready.
    pub fn check_callback_ready(&self, id: &SeedId, turn: u32) -> bool {
        self.get_seed(id)
            .is_some_and(|seed| seed.is_callback_ready(turn))
    }

    /// Commit to paying the seed off now, whatever its momentum.
    pub fn mark_callback(&mut self, id: &SeedId) -> Result<SeedMutation, LedgerError> {
        self.mutate(id, |seed| {
            info!(seed = %seed.id, "seed marked for callback");
            SeedPatch::status(SeedStatus::Callback)
        })
    }

    pub fn resolve_seed(
        &mut self,
        id: &SeedId,
        turn: u32,
        resolution_narrative: &str,
    ) -> Result<SeedMutation, LedgerError> {
        let limit = self.config.narrative_limit;
        self.mutate(id, |seed| {
            info!(seed = %seed.id, turn, "seed resolved");
            SeedPatch {
                status: Some(SeedStatus::Resolved),
                resolved_turn: Some(turn),
                resolution_narrative: Some(truncate_chars(resolution_narrative, limit)),
                ..Default::default()
            }
        })
    }

    pub fn abandon_seed(
        &mut self,
        id: &SeedId,
        reason: Option<&str>,
    ) -> Result<SeedMutation, LedgerError> {
        let limit = self.config.narrative_limit;
        self.mutate(id, |seed| {
            info!(seed = %seed.id, reason = reason.unwrap_or(""), "seed abandoned");
            SeedPatch {
                status: Some(SeedStatus::Abandoned),
                resolution_narrative: reason
                    .map(|reason| truncate_chars(&format!("Abandoned: {}", reason), limit)),
                ..Default::default()
            }
        })
    }

    /// Move waiting seeds past their payoff window to `Overdue`, then return
    /// every overdue seed in planting order.
    ///
    /// The result is not limited to seeds this call transitioned: seeds that
    /// became overdue on an earlier call stay in it until they are resolved or
    /// abandoned.
    pub fn get_overdue_seeds(&mut self, turn: u32) -> Result<Vec<ForeshadowingSeed>, LedgerError> {
        let lapsed: Vec<SeedId> = self
            .seeds
            .values()
            .filter(|seed| seed.is_past_window(turn))
            .map(|seed| seed.id)
            .collect();

        for id in &lapsed {
            let mutation = self.mutate(id, |seed| {
                info!(seed = %seed.id, overdue_by = seed.turns_overdue(turn), "seed is overdue");
                SeedPatch::status(SeedStatus::Overdue)
            })?;
            debug_assert!(mutation.is_applied());
        }

        Ok(self
            .seeds
            .values()
            .filter(|seed| seed.status == SeedStatus::Overdue)
            .cloned()
            .collect())
    }

    /// Seeds ready for callback, most urgent first. Equal urgency keeps
    /// planting order.
    pub fn get_callback_opportunities(&self, turn: u32) -> Vec<&ForeshadowingSeed> {
        let mut ready: Vec<&ForeshadowingSeed> = self
            .seeds
            .values()
            .filter(|seed| seed.is_callback_ready(turn))
            .collect();
        ready.sort_by(|a, b| {
            b.urgency
                .partial_cmp(&a.urgency)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ready
    }

    /// Seeds that are neither resolved nor abandoned.
    pub fn get_active_seeds(&self) -> Vec<&ForeshadowingSeed> {
        self.seeds
            .values()
            .filter(|seed| !seed.status.is_terminal())
            .collect()
    }

    /// Mention every active seed whose related NPCs or tags appear in `text`
    /// (case-insensitive) and return their ids.
    ///
    /// This scans every active seed's NPCs and tags per call, which is fine for
    /// the tens of seeds a campaign carries.
    pub fn detect_seed_in_narrative(
        &mut self,
        text: &str,
        turn: u32,
    ) -> Result<Vec<SeedId>, LedgerError> {
        let lowered = text.to_lowercase();
        let detected: Vec<SeedId> = self
            .get_active_seeds()
            .into_iter()
            .filter(|seed| seed.is_referenced_in(&lowered))
            .map(|seed| seed.id)
            .collect();

        for id in &detected {
            let _ = self.mention_seed(id, turn)?;
        }
        if !detected.is_empty() {
            debug!(count = detected.len(), turn, "seeds detected in narrative");
        }
        Ok(detected)
    }

    /// Build the director report. Runs the overdue sweep first.
    pub fn director_context(&mut self, turn: u32) -> Result<DirectorContext, LedgerError> {
        let overdue = self.get_overdue_seeds(turn)?;
        let preview = self.config.payoff_preview_chars;

        let callbacks = self
            .get_callback_opportunities(turn)
            .into_iter()
            .take(self.config.director_callback_limit)
            .map(|seed| {
                let mut payoff_preview = truncate_chars(&seed.expected_payoff, preview);
                if payoff_preview.len() < seed.expected_payoff.len() {
                    payoff_preview.push_str("...");
                }
                CallbackNote {
                    id: seed.id,
                    seed_type: seed.seed_type,
                    description: seed.description.clone(),
                    urgency: seed.urgency,
                    payoff_preview,
                }
            })
            .collect();

        let growing = self
            .seeds
            .values()
            .filter(|seed| seed.status == SeedStatus::Growing)
            .take(self.config.director_growing_limit)
            .map(|seed| GrowingNote {
                id: seed.id,
                seed_type: seed.seed_type,
                description: seed.description.clone(),
                mentions: seed.mentions,
            })
            .collect();

        Ok(DirectorContext {
            turn,
            active_count: self.get_active_seeds().len(),
            callbacks,
            overdue: overdue
                .into_iter()
                .map(|seed| OverdueNote {
                    id: seed.id,
                    seed_type: seed.seed_type,
                    turns_overdue: seed.turns_overdue(turn),
                    description: seed.description,
                })
                .collect(),
            growing,
        })
    }

    /// Render the director report as prompt text.
    pub fn generate_director_context(&mut self, turn: u32) -> Result<String, LedgerError> {
        Ok(self.director_context(turn)?.to_prompt_string())
    }

    /// Ids in the seed's `depends_on` list that are not yet resolved.
    ///
    /// Causal links are recorded, not enforced: this is a read-only query.
    pub fn pending_dependencies(&self, id: &SeedId) -> Vec<SeedId> {
        self.get_seed(id)
            .map(|seed| {
                seed.depends_on
                    .iter()
                    .filter(|dep| {
                        self.get_seed(dep)
                            .map_or(true, |dep| dep.status != SeedStatus::Resolved)
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            campaign: self.campaign,
            seeds: self.seeds.values().cloned().collect(),
        }
    }

    /// Import a snapshot: every seed is upserted into `store`, then the ledger
    /// is opened from the store so ids keep deriving from persisted state.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        mut store: S,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        for seed in &snapshot.seeds {
            if seed.id.campaign != snapshot.campaign {
                return Err(LedgerError::CampaignMismatch {
                    expected: snapshot.campaign,
                    seed: seed.id,
                });
            }
        }
        for seed in &snapshot.seeds {
            store.save_seed(seed)?;
        }
        info!(campaign = %snapshot.campaign, seeds = snapshot.seeds.len(), "ledger imported");
        Self::open(snapshot.campaign, store, config)
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str, store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let snapshot: LedgerSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot, store, config)
    }
}
