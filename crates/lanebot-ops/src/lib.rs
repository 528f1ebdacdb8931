//! Operational helpers: logging setup and match history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lanebot_types::{config::OpsConfig, outcome::OutcomeKind, BotError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| ops_error(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| ops_error(format!("tracing init error: {err}")))?;
    Ok(())
}

/// One finished match attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub outcome: OutcomeKind,
    /// Last game clock seen before the attempt ended, in seconds.
    pub game_time: u32,
    pub ended_at: DateTime<Utc>,
}

/// In-memory record of match attempts for the current process.
#[derive(Clone, Default)]
pub struct MatchHistory {
    records: Arc<Mutex<Vec<MatchRecord>>>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, record: MatchRecord) {
        self.records.lock().await.push(record);
    }

    pub async fn records(&self) -> Vec<MatchRecord> {
        self.records.lock().await.clone()
    }

    pub async fn completed_count(&self) -> usize {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.outcome == OutcomeKind::Completed)
            .count()
    }
}

pub fn ops_error(message: impl Into<String>) -> BotError {
    BotError::Ops(message.into())
}
