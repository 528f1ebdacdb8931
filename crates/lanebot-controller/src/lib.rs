//! Input-simulation and client-process boundary.
//!
//! The play loop only ever talks to these traits; the OS-level backend
//! (mouse/keyboard injection) plugs in behind them.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lanebot_types::{
    screen::ScreenRatio,
    snapshot::SnapshotSource,
    BotError, Result,
};
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

mod shell;

pub use shell::{ShellProcessControl, ShellWindowProbe};

/// How often a long attack-move hold re-checks the live state.
const ATTACK_SLICE: Duration = Duration::from_millis(250);

/// High-level input primitives issued by the play loop.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Click { at: ScreenRatio, hold_secs: f64 },
    RightClick { at: ScreenRatio, hold_secs: f64 },
    Press { key: String, hold_secs: f64 },
    AttackMove { toward: ScreenRatio, duration_secs: f64 },
}

/// Aggregated input counters.
#[derive(Debug, Default, Clone)]
pub struct InputMetrics {
    pub issued: u64,
    pub failed: u64,
    pub last_action_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait GameInput: Send + Sync {
    async fn click(&self, at: ScreenRatio, hold_secs: f64) -> Result<()>;
    async fn right_click(&self, at: ScreenRatio, hold_secs: f64) -> Result<()>;
    async fn press(&self, key: &str, hold_secs: f64) -> Result<()>;
    /// Attack-move toward a spot for up to `duration_secs`, consulting
    /// `state` so the hold cuts itself short when the player dies or the
    /// phase moves past the one the hold started in.
    async fn attack_move(
        &self,
        toward: ScreenRatio,
        duration_secs: f64,
        state: &dyn SnapshotSource,
    ) -> Result<()>;
    fn metrics(&self) -> InputMetrics;
}

/// Reports whether the game client window currently exists.
#[async_trait]
pub trait WindowProbe: Send + Sync {
    async fn exists(&self) -> bool;
}

#[async_trait]
impl<T: WindowProbe + ?Sized> WindowProbe for Arc<T> {
    async fn exists(&self) -> bool {
        (**self).exists().await
    }
}

/// Kills the game client when a match attempt has to be torn down.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    async fn kill_game_client(&self) -> Result<()>;
}

/// Recording input backend used for tests and dry runs. Every action is
/// captured and timed with a short fixed pause instead of the real hold.
#[derive(Clone, Default)]
pub struct MockInput {
    actions: Arc<Mutex<Vec<InputAction>>>,
    metrics: Arc<Mutex<InputMetrics>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<InputAction> {
        self.actions.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn record(&self, action: InputAction) -> Result<()> {
        let mut actions = self
            .actions
            .lock()
            .map_err(|_| input_error("failed to lock action log"))?;
        actions.push(action);
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.issued += 1;
            metrics.last_action_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl GameInput for MockInput {
    async fn click(&self, at: ScreenRatio, hold_secs: f64) -> Result<()> {
        ensure_valid_hold(hold_secs)?;
        self.record(InputAction::Click { at, hold_secs })?;
        sleep(Duration::from_millis(25)).await;
        Ok(())
    }

    async fn right_click(&self, at: ScreenRatio, hold_secs: f64) -> Result<()> {
        ensure_valid_hold(hold_secs)?;
        self.record(InputAction::RightClick { at, hold_secs })?;
        sleep(Duration::from_millis(25)).await;
        Ok(())
    }

    async fn press(&self, key: &str, hold_secs: f64) -> Result<()> {
        ensure_valid_hold(hold_secs)?;
        self.record(InputAction::Press {
            key: key.to_string(),
            hold_secs,
        })?;
        sleep(Duration::from_millis(25)).await;
        Ok(())
    }

    async fn attack_move(
        &self,
        toward: ScreenRatio,
        duration_secs: f64,
        state: &dyn SnapshotSource,
    ) -> Result<()> {
        ensure_valid_hold(duration_secs)?;
        self.record(InputAction::AttackMove {
            toward,
            duration_secs,
        })?;

        let started = state.snapshot();
        let deadline = Instant::now() + Duration::from_secs_f64(duration_secs);
        while Instant::now() < deadline {
            let current = state.snapshot();
            if current.is_dead || current.phase != started.phase {
                debug!(
                    phase = %current.phase,
                    is_dead = current.is_dead,
                    "attack-move hold cut short"
                );
                break;
            }
            sleep(ATTACK_SLICE).await;
        }
        Ok(())
    }

    fn metrics(&self) -> InputMetrics {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

/// Window probe answering from a queue, then a constant fallback.
pub struct ScriptedWindowProbe {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
}

impl ScriptedWindowProbe {
    pub fn always(exists: bool) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            fallback: exists,
        }
    }

    pub fn scripted(answers: Vec<bool>, fallback: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            fallback,
        }
    }
}

#[async_trait]
impl WindowProbe for ScriptedWindowProbe {
    async fn exists(&self) -> bool {
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .unwrap_or(self.fallback)
    }
}

/// Counts kill requests instead of touching any process.
#[derive(Clone, Default)]
pub struct MockProcessControl {
    kills: Arc<Mutex<u64>>,
}

impl MockProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kill_count(&self) -> u64 {
        self.kills.lock().map(|k| *k).unwrap_or(0)
    }
}

#[async_trait]
impl ProcessControl for MockProcessControl {
    async fn kill_game_client(&self) -> Result<()> {
        if let Ok(mut kills) = self.kills.lock() {
            *kills += 1;
        }
        Ok(())
    }
}

/// Generate an error aligned with input semantics.
pub fn input_error(message: impl Into<String>) -> BotError {
    BotError::Input(message.into())
}

/// Holds must be finite and non-negative before they reach a backend.
pub fn ensure_valid_hold(hold_secs: f64) -> Result<()> {
    if hold_secs.is_finite() && hold_secs >= 0.0 {
        Ok(())
    } else {
        Err(input_error(format!("invalid hold duration: {hold_secs}")))
    }
}
