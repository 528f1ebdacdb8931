use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phase::MatchPhase;

/// High-level event kinds moving through the in-process feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lifecycle,
    PhaseChange,
    Ops,
}

/// Immutable event envelope for logging and live observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Lifecycle(LifecycleEvent),
    Phase(PhaseChangeEvent),
    Ops(OpsEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub stage: LifecycleStage,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStage {
    WindowOpen,
    Connected,
    MatchStart,
    MatchEnd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseChangeEvent {
    pub from: MatchPhase,
    pub to: MatchPhase,
    pub game_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsEvent {
    pub message: String,
}

impl MatchEvent {
    pub fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn lifecycle(stage: LifecycleStage, details: Option<String>) -> Self {
        Self::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent { stage, details }),
        )
    }

    pub fn phase_change(from: MatchPhase, to: MatchPhase, game_time: u32) -> Self {
        Self::new(
            EventKind::PhaseChange,
            EventPayload::Phase(PhaseChangeEvent {
                from,
                to,
                game_time,
            }),
        )
    }
}
