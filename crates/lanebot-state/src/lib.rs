//! Match-state ownership: polling the live endpoint, deriving the
//! snapshot, and the background refresh loop.

mod fetcher;
mod poller;
mod tracker;

pub use fetcher::{PlayerReadout, SnapshotFetcher};
pub use poller::spawn_poll_loop;
pub use tracker::{MatchState, MatchTracker};

use lanebot_types::BotError;

/// Generate an error aligned with state-tracking semantics.
pub fn state_error(message: impl Into<String>) -> BotError {
    BotError::State(message.into())
}
