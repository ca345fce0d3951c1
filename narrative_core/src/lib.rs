//! # Narrative Core
//!
//! Long-running narrative commitments for a campaign. This crate tracks
//! foreshadowing seeds from the turn they are planted to their payoff and
//! renders a compact report for narrative-planning prompts.
//!
//! ## Core Components
//!
//! - **foreshadowing**: the seed model and the per-campaign `ForeshadowingLedger`
//! - **seed_store**: durability for seeds, in memory or as JSON files
//! - **config**: ledger tunables loaded from TOML
//!
//! ## Design Philosophy
//!
//! - **Tolerant**: seed ids from generated text may be stale or invented; such
//!   calls are reported, not fatal
//! - **Store-Backed**: the seed store is the only source of truth for ids and
//!   is written before memory changes

pub mod config;
pub mod error;
pub mod foreshadowing;
pub mod seed_store;

pub use config::*;
pub use error::*;
pub use foreshadowing::*;
pub use seed_store::*;
