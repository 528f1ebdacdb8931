use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BotError;

/// How a match attempt ended. `Completed` and `Aborted` are both success
/// paths; only `Failed` asks the caller to clean up and retry later.
#[derive(Debug)]
pub enum MatchOutcome {
    /// The game window closed after being open: the match ran to its end.
    Completed,
    /// The operator asked the bot to stop; the process exits cleanly.
    Aborted,
    /// A fatal error ended the attempt; the game client has been killed.
    Failed(BotError),
}

impl MatchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, MatchOutcome::Failed(_))
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            MatchOutcome::Completed => OutcomeKind::Completed,
            MatchOutcome::Aborted => OutcomeKind::Aborted,
            MatchOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Completed => f.write_str("completed"),
            MatchOutcome::Aborted => f.write_str("aborted"),
            MatchOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Serializable outcome tag for match history records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Completed,
    Aborted,
    Failed,
}
