use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BotError, Result};

/// Seconds of game time after which the loading screen is over.
pub const LOADING_SCREEN_END_SECS: u32 = 3;
/// Minions clash around 90 seconds; the bot leaves base shortly before.
pub const MINIONS_CLASH_SECS: u32 = 80;
/// Matches longer than this are considered stuck.
pub const MAX_MATCH_SECS: u32 = 3000;

/// Coarse match-progress classification driving which scripted behavior runs.
///
/// Transitions are one-directional: a match walks forward through the
/// variants and `LateGame`, once entered, is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    LoadingScreen,
    PreMinions,
    EarlyGame,
    LateGame,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPhase::LoadingScreen => "loading screen",
            MatchPhase::PreMinions => "pre-minions",
            MatchPhase::EarlyGame => "early game",
            MatchPhase::LateGame => "late game",
        };
        f.write_str(name)
    }
}

/// Derives the current phase from elapsed game time and the sticky
/// mid-objective flag. Pure; transition logging happens at the tracker.
pub fn classify_phase(game_time: u32, objective_destroyed: bool) -> Result<MatchPhase> {
    if game_time < LOADING_SCREEN_END_SECS {
        Ok(MatchPhase::LoadingScreen)
    } else if game_time < MINIONS_CLASH_SECS {
        Ok(MatchPhase::PreMinions)
    } else if !objective_destroyed {
        Ok(MatchPhase::EarlyGame)
    } else if game_time < MAX_MATCH_SECS {
        Ok(MatchPhase::LateGame)
    } else {
        Err(BotError::MatchTimeExceeded)
    }
}
