//! Director context - a compact foreshadowing report for generation prompts.

use serde::{Deserialize, Serialize};

use super::{SeedId, SeedType};

/// A seed ready to pay off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackNote {
    pub id: SeedId,
    pub seed_type: SeedType,
    pub description: String,
    pub urgency: f32,
    /// Expected payoff, truncated.
    pub payoff_preview: String,
}

/// A seed past its payoff window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueNote {
    pub id: SeedId,
    pub seed_type: SeedType,
    pub description: String,
    pub turns_overdue: u32,
}

/// A seed gathering momentum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowingNote {
    pub id: SeedId,
    pub seed_type: SeedType,
    pub description: String,
    pub mentions: u32,
}

/// The foreshadowing state as the narrative director should see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorContext {
    pub turn: u32,
    pub active_count: usize,
    pub callbacks: Vec<CallbackNote>,
    pub overdue: Vec<OverdueNote>,
    pub growing: Vec<GrowingNote>,
}

impl DirectorContext {
    /// Format the report as a prompt section.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("## Foreshadowing (Turn {})\n", self.turn));
        if self.active_count == 0 {
            prompt.push_str("No active seeds.\n");
            return prompt;
        }
        prompt.push_str(&format!("Active seeds: {}\n\n", self.active_count));

        if !self.callbacks.is_empty() {
            prompt.push_str("### Ready for Callback\n");
            for note in &self.callbacks {
                prompt.push_str(&format!(
                    "- [{}] {} (urgency {:.2})",
                    note.seed_type.name(),
                    note.description,
                    note.urgency
                ));
                if !note.payoff_preview.is_empty() {
                    prompt.push_str(&format!(" -> {}", note.payoff_preview));
                }
                prompt.push('\n');
            }
            prompt.push('\n');
        }

        if !self.overdue.is_empty() {
            prompt.push_str("### Overdue\n");
            for note in &self.overdue {
                prompt.push_str(&format!(
                    "- [{}] {}: {} turn{} overdue\n",
                    note.seed_type.name(),
                    note.description,
                    note.turns_overdue,
                    if note.turns_overdue == 1 { "" } else { "s" }
                ));
            }
            prompt.push('\n');
        }

        if !self.growing.is_empty() {
            prompt.push_str("### Growing\n");
            for note in &self.growing {
                prompt.push_str(&format!(
                    "- [{}] {} ({} mentions)\n",
                    note.seed_type.name(),
                    note.description,
                    note.mentions
                ));
            }
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foreshadowing::CampaignId;

    #[test]
    fn test_empty_report() {
        let context = DirectorContext {
            turn: 4,
            active_count: 0,
            callbacks: vec![],
            overdue: vec![],
            growing: vec![],
        };
        let prompt = context.to_prompt_string();
        assert!(prompt.contains("Turn 4"));
        assert!(prompt.contains("No active seeds"));
        assert!(!prompt.contains("###"));
    }

    #[test]
    fn test_sections_render() {
        let campaign = CampaignId::new();
        let context = DirectorContext {
            turn: 40,
            active_count: 3,
            callbacks: vec![CallbackNote {
                id: SeedId::new(campaign, 1),
                seed_type: SeedType::Mystery,
                description: "The sealed tower".to_string(),
                urgency: 0.8,
                payoff_preview: "The tower holds the lost queen".to_string(),
            }],
            overdue: vec![OverdueNote {
                id: SeedId::new(campaign, 2),
                seed_type: SeedType::Threat,
                description: "Bandit revenge".to_string(),
                turns_overdue: 1,
            }],
            growing: vec![GrowingNote {
                id: SeedId::new(campaign, 3),
                seed_type: SeedType::Promise,
                description: "Return the sword".to_string(),
                mentions: 4,
            }],
        };

        let prompt = context.to_prompt_string();
        assert!(prompt.contains("Active seeds: 3"));
        assert!(prompt.contains("[Mystery] The sealed tower (urgency 0.80) -> The tower holds"));
        assert!(prompt.contains("Bandit revenge: 1 turn overdue"));
        assert!(prompt.contains("Return the sword (4 mentions)"));
    }
}
