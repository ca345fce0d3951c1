//! Seed definitions - planted narrative commitments awaiting payoff.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SeedIdParseError;

/// Unique identifier for campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    /// Create a new random campaign ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a seed: its campaign plus a sequence number assigned from
/// the seed store's highest persisted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeedId {
    pub campaign: CampaignId,
    pub sequence: u64,
}

impl SeedId {
    pub fn new(campaign: CampaignId, sequence: u64) -> Self {
        Self { campaign, sequence }
    }
}

impl std::fmt::Display for SeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seed-{}@{}", self.sequence, self.campaign)
    }
}

impl FromStr for SeedId {
    type Err = SeedIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SeedIdParseError(s.to_string());
        let (sequence, campaign) = s
            .trim()
            .strip_prefix("seed-")
            .and_then(|rest| rest.split_once('@'))
            .ok_or_else(malformed)?;
        let sequence = sequence.parse().map_err(|_| malformed())?;
        let campaign = Uuid::parse_str(campaign).map_err(|_| malformed())?;
        Ok(Self::new(CampaignId(campaign), sequence))
    }
}

/// What kind of narrative commitment a seed is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedType {
    Plot,
    Character,
    Mystery,
    Threat,
    Promise,
    /// An object or detail introduced so it can matter later.
    Chekhov,
    Relationship,
}

impl SeedType {
    pub fn name(&self) -> &'static str {
        match self {
            SeedType::Plot => "Plot",
            SeedType::Character => "Character",
            SeedType::Mystery => "Mystery",
            SeedType::Threat => "Threat",
            SeedType::Promise => "Promise",
            SeedType::Chekhov => "Chekhov",
            SeedType::Relationship => "Relationship",
        }
    }
}

/// Lifecycle status of a seed.
///
/// `Planted → Growing → Callback → Resolved`, with `Abandoned` reachable from
/// any live status. `Overdue` is entered lazily when a query notices the
/// payoff window has passed; it is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedStatus {
    Planted,
    Growing,
    Callback,
    Resolved,
    Abandoned,
    Overdue,
}

impl SeedStatus {
    /// Resolved and abandoned seeds accept no further changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SeedStatus::Resolved | SeedStatus::Abandoned)
    }

    /// Still waiting for a payoff to become ready.
    pub fn is_waiting(&self) -> bool {
        matches!(self, SeedStatus::Planted | SeedStatus::Growing)
    }
}

/// A planted narrative commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeshadowingSeed {
    pub id: SeedId,
    pub seed_type: SeedType,
    pub status: SeedStatus,

    pub description: String,
    /// The narrative text the seed was planted in (truncated).
    pub planted_narrative: String,
    pub expected_payoff: String,

    pub planted_turn: u32,
    pub planted_session: u32,
    pub min_turns_to_payoff: u32,
    pub max_turns_to_payoff: u32,

    pub mentions: u32,
    pub last_mentioned_turn: u32,
    /// Callback priority from 0.0 to 1.0; rises with mentions.
    pub urgency: f32,

    pub resolved_turn: Option<u32>,
    pub resolution_narrative: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_npcs: Vec<String>,
    #[serde(default)]
    pub related_locations: Vec<String>,

    /// Seeds that should pay off before this one.
    #[serde(default)]
    pub depends_on: Vec<SeedId>,
    /// Seeds this one's payoff sets in motion.
    #[serde(default)]
    pub triggers: Vec<SeedId>,
    /// Seeds that cannot both pay off.
    #[serde(default)]
    pub conflicts_with: Vec<SeedId>,
}

impl ForeshadowingSeed {
    pub fn turns_since_planted(&self, turn: u32) -> u32 {
        turn.saturating_sub(self.planted_turn)
    }

    /// Waiting and at least `min_turns_to_payoff` old.
    pub fn is_callback_ready(&self, turn: u32) -> bool {
        self.status.is_waiting() && self.turns_since_planted(turn) >= self.min_turns_to_payoff
    }

    /// Waiting and past `max_turns_to_payoff`.
    pub fn is_past_window(&self, turn: u32) -> bool {
        self.status.is_waiting() && self.turns_since_planted(turn) > self.max_turns_to_payoff
    }

    pub fn turns_overdue(&self, turn: u32) -> u32 {
        self.turns_since_planted(turn)
            .saturating_sub(self.max_turns_to_payoff)
    }

    /// Whether any related NPC or tag occurs in `lowercase_text`.
    pub(crate) fn is_referenced_in(&self, lowercase_text: &str) -> bool {
        self.related_npcs
            .iter()
            .chain(self.tags.iter())
            .filter(|needle| !needle.trim().is_empty())
            .any(|needle| lowercase_text.contains(&needle.to_lowercase()))
    }
}

/// Partial update of a persisted seed. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedPatch {
    pub status: Option<SeedStatus>,
    pub mentions: Option<u32>,
    pub last_mentioned_turn: Option<u32>,
    pub urgency: Option<f32>,
    pub resolved_turn: Option<u32>,
    pub resolution_narrative: Option<String>,
}

impl SeedPatch {
    pub fn status(status: SeedStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, seed: &mut ForeshadowingSeed) {
        if let Some(status) = self.status {
            seed.status = status;
        }
        if let Some(mentions) = self.mentions {
            seed.mentions = mentions;
        }
        if let Some(turn) = self.last_mentioned_turn {
            seed.last_mentioned_turn = turn;
        }
        if let Some(urgency) = self.urgency {
            seed.urgency = urgency;
        }
        if let Some(turn) = self.resolved_turn {
            seed.resolved_turn = Some(turn);
        }
        if let Some(narrative) = &self.resolution_narrative {
            seed.resolution_narrative = Some(narrative.clone());
        }
    }
}

/// Everything needed to plant a seed. Unset payoff windows fall back to the
/// ledger's configured defaults.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub seed_type: SeedType,
    pub description: String,
    pub planted_narrative: String,
    pub expected_payoff: String,
    pub turn: u32,
    pub session: u32,
    pub tags: Vec<String>,
    pub related_npcs: Vec<String>,
    pub related_locations: Vec<String>,
    pub min_turns_to_payoff: Option<u32>,
    pub max_turns_to_payoff: Option<u32>,
    pub depends_on: Vec<SeedId>,
    pub triggers: Vec<SeedId>,
    pub conflicts_with: Vec<SeedId>,
}

impl SeedPlan {
    pub fn new(seed_type: SeedType, description: impl Into<String>) -> Self {
        Self {
            seed_type,
            description: description.into(),
            planted_narrative: String::new(),
            expected_payoff: String::new(),
            turn: 0,
            session: 0,
            tags: Vec::new(),
            related_npcs: Vec::new(),
            related_locations: Vec::new(),
            min_turns_to_payoff: None,
            max_turns_to_payoff: None,
            depends_on: Vec::new(),
            triggers: Vec::new(),
            conflicts_with: Vec::new(),
        }
    }

    /// Turn and session the seed is planted in.
    pub fn planted_at(mut self, turn: u32, session: u32) -> Self {
        self.turn = turn;
        self.session = session;
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.planted_narrative = narrative.into();
        self
    }

    pub fn with_payoff(mut self, payoff: impl Into<String>) -> Self {
        self.expected_payoff = payoff.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_npc(mut self, npc: impl Into<String>) -> Self {
        self.related_npcs.push(npc.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.related_locations.push(location.into());
        self
    }

    pub fn with_payoff_window(mut self, min_turns: u32, max_turns: u32) -> Self {
        self.min_turns_to_payoff = Some(min_turns);
        self.max_turns_to_payoff = Some(max_turns);
        self
    }

    pub fn depends_on(mut self, id: SeedId) -> Self {
        self.depends_on.push(id);
        self
    }

    pub fn triggers(mut self, id: SeedId) -> Self {
        self.triggers.push(id);
        self
    }

    pub fn conflicts_with(mut self, id: SeedId) -> Self {
        self.conflicts_with.push(id);
        self
    }
}

/// Truncate to at most `limit` characters, never splitting a code point.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
