//! # Game State
//!
//! Addressable game state and the transaction engine that mutates it. This
//! crate is the single source of truth for resource pools, character fields
//! and world fields, and does not contain any AI logic.
//!
//! ## Core Components
//!
//! - **state**: `StatePath` addresses, `StateValue`s, and the `StateStore` trait
//! - **world_state**: the concrete in-memory store for one campaign
//! - **constraints**: bounds (`min`, `max`, live `max_ref`) attached to paths
//! - **transaction**: batches of changes validated against the store and
//!   applied all-or-nothing
//!
//! Narrative generation may compute a change against a stale snapshot. Every
//! change records the value it was computed from, and validation rejects the
//! whole batch when the store has moved on.

pub mod constraints;
pub mod entities;
pub mod error;
pub mod state;
pub mod transaction;
pub mod world_state;

pub use constraints::*;
pub use entities::*;
pub use error::*;
pub use state::*;
pub use transaction::*;
pub use world_state::*;
