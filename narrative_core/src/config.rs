//! Ledger configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for the foreshadowing ledger. Missing keys in a config file keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Turns a seed must age before it is ready for callback.
    pub default_min_turns_to_payoff: u32,
    /// Turns after which an unpaid seed becomes overdue.
    pub default_max_turns_to_payoff: u32,
    /// Urgency of a new seed. Urgency always stays within `0.0..=1.0`.
    pub initial_urgency: f32,
    /// Urgency gained per mention.
    pub mention_urgency_step: f32,
    /// Mentions at which a planted seed starts growing.
    pub growing_mention_threshold: u32,
    /// Character limit for stored narrative excerpts.
    pub narrative_limit: usize,
    pub director_callback_limit: usize,
    pub director_growing_limit: usize,
    /// Character limit for expected payoffs in the director report.
    pub payoff_preview_chars: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_min_turns_to_payoff: 5,
            default_max_turns_to_payoff: 50,
            initial_urgency: 0.5,
            mention_urgency_step: 0.1,
            growing_mention_threshold: 3,
            narrative_limit: 500,
            director_callback_limit: 5,
            director_growing_limit: 3,
            payoff_preview_chars: 80,
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}
