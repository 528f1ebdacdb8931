use thiserror::Error;

pub type Result<T, E = BotError> = std::result::Result<T, E>;

/// Unified error type covering failure scenarios across subsystems.
///
/// The first group of variants are fatal match-ending conditions; the
/// string-carrying variants wrap lower-level subsystem failures.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("game window did not open")]
    WindowNotFound,
    #[error("game window disappeared")]
    WindowLost,
    #[error("game window opened but the live data endpoint never answered")]
    ConnectionTimeout,
    #[error("lost connection to the live data endpoint")]
    ConnectionLost,
    #[error("loading screen exceeded its time limit")]
    LoadingTimeout,
    #[error("match exceeded the maximum game time")]
    MatchTimeExceeded,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("client error: {0}")]
    Client(String),
    #[error("input error: {0}")]
    Input(String),
    #[error("state error: {0}")]
    State(String),
    #[error("ops error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
