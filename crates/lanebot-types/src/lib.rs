//! Shared domain types for the lanebot workspace.

pub mod abilities;
pub mod config;
pub mod events;
pub mod outcome;
pub mod phase;
pub mod screen;
pub mod snapshot;

mod errors;

pub use errors::{BotError, Result};
