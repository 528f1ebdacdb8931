//! Top-level match driver: waits for the game to come up, runs the
//! state poller and the action policy side by side, and reduces a whole
//! match attempt to one [`MatchOutcome`].

mod policy;

pub use policy::{attack_window, ActionPolicy, LaneObjective};

use std::sync::Arc;

use chrono::Utc;
use lanebot_client::LiveStateClient;
use lanebot_controller::{GameInput, ProcessControl, WindowProbe};
use lanebot_feed::MatchFeed;
use lanebot_ops::{MatchHistory, MatchRecord};
use lanebot_state::{spawn_poll_loop, state_error, MatchTracker, SnapshotFetcher};
use lanebot_types::{
    config::BotConfig,
    events::{LifecycleStage, MatchEvent},
    outcome::MatchOutcome,
    phase::MatchPhase,
    screen::CENTER_OF_SCREEN,
    BotError, Result,
};
use tokio::{
    sync::watch,
    time::{sleep, Duration},
};
use tracing::{info, warn};

/// Why the dispatch loop stopped handing phases to the policy.
enum LoopExit {
    Aborted,
    Policy(BotError),
    PollStopped,
}

/// Plays matches one at a time. Reusable across matches so history and
/// the abort signal carry over.
pub struct MatchDriver<C, W, I, P> {
    config: BotConfig,
    client: Arc<C>,
    window: Arc<W>,
    input: I,
    process: P,
    feed: Arc<dyn MatchFeed>,
    history: MatchHistory,
    abort: watch::Receiver<bool>,
    last_game_time: u32,
}

impl<C, W, I, P> MatchDriver<C, W, I, P>
where
    C: LiveStateClient + 'static,
    W: WindowProbe + 'static,
    I: GameInput,
    P: ProcessControl,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: BotConfig,
        client: Arc<C>,
        window: Arc<W>,
        input: I,
        process: P,
        feed: Arc<dyn MatchFeed>,
        history: MatchHistory,
        abort: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            client,
            window,
            input,
            process,
            feed,
            history,
            abort,
            last_game_time: 0,
        }
    }

    /// Plays one match start to finish and always comes back with an
    /// outcome. Failures have already killed the game client and waited
    /// out the cooldown by the time this returns.
    pub async fn play_match(&mut self) -> MatchOutcome {
        self.last_game_time = 0;
        let outcome = match self.run().await {
            Ok(outcome) => outcome,
            Err(BotError::WindowLost) => {
                // The window going away after being open is how a
                // finished match looks from the outside.
                info!("game window closed, match is over");
                MatchOutcome::Completed
            }
            Err(err) => self.fail(err).await,
        };

        info!(game_time = self.last_game_time, "match {outcome}");
        self.history
            .record(MatchRecord {
                outcome: outcome.kind(),
                game_time: self.last_game_time,
                ended_at: Utc::now(),
            })
            .await;
        if let Err(err) = self
            .feed
            .publish(MatchEvent::lifecycle(
                LifecycleStage::MatchEnd,
                Some(outcome.to_string()),
            ))
            .await
        {
            warn!("could not publish match end: {err}");
        }
        outcome
    }

    async fn run(&mut self) -> Result<MatchOutcome> {
        self.wait_for_window().await?;
        self.wait_for_connection().await?;

        let fetcher = SnapshotFetcher::new(
            self.client.clone(),
            self.window.clone(),
            self.config.client.max_poll_failures,
        );
        let tracker = MatchTracker::new(fetcher, self.feed.clone());
        let state = tracker.state();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poll_task = spawn_poll_loop(
            tracker,
            Duration::from_secs_f64(self.config.driver.poll_interval_secs),
            shutdown_rx,
        );

        self.feed
            .publish(MatchEvent::lifecycle(LifecycleStage::MatchStart, None))
            .await?;

        let mut policy = ActionPolicy::new(
            &self.input,
            state.clone(),
            self.config.policy.clone(),
            Duration::from_secs(self.config.driver.loading_screen_timeout_secs),
            self.abort.clone(),
        );

        let exit = loop {
            if *self.abort.borrow() {
                break LoopExit::Aborted;
            }
            if poll_task.is_finished() {
                break LoopExit::PollStopped;
            }
            let step = match state.phase() {
                MatchPhase::LoadingScreen => policy.loading_screen().await,
                MatchPhase::PreMinions => policy.opening().await,
                MatchPhase::EarlyGame => {
                    policy
                        .play(
                            LaneObjective::CenterMid,
                            self.config.policy.early_lane_travel_secs,
                        )
                        .await
                }
                MatchPhase::LateGame => {
                    policy
                        .play(
                            LaneObjective::EnemyNexus,
                            self.config.policy.late_lane_travel_secs,
                        )
                        .await
                }
            };
            if let Err(err) = step {
                break LoopExit::Policy(err);
            }
        };

        self.last_game_time = state.game_time();

        // Every exit path joins the poll task, so no poller outlives
        // the match it was started for.
        let _ = shutdown_tx.send(true);
        let poll_result = match poll_task.await {
            Ok(result) => result,
            Err(err) => Err(state_error(format!("poll loop panicked: {err}"))),
        };

        match exit {
            LoopExit::Aborted => {
                info!("stop requested, leaving the match");
                Ok(MatchOutcome::Aborted)
            }
            LoopExit::Policy(err) => Err(err),
            LoopExit::PollStopped => Err(poll_result.err().unwrap_or_else(|| {
                state_error("poll loop stopped without reporting an error")
            })),
        }
    }

    /// Polls for the game window, then clicks into it so later input
    /// lands in the right place.
    async fn wait_for_window(&self) -> Result<()> {
        info!("waiting for the game window");
        for _ in 0..self.config.driver.window_wait_secs {
            sleep(Duration::from_secs(1)).await;
            if self.window.exists().await {
                info!("game window is open");
                self.input.click(CENTER_OF_SCREEN, 2.0).await?;
                self.input.click(CENTER_OF_SCREEN, 0.0).await?;
                self.feed
                    .publish(MatchEvent::lifecycle(
                        LifecycleStage::WindowOpen,
                        Some(self.config.window.title.clone()),
                    ))
                    .await?;
                return Ok(());
            }
        }
        Err(BotError::WindowNotFound)
    }

    /// The live endpoint only starts serving once the match is loading.
    async fn wait_for_connection(&self) -> Result<()> {
        info!("waiting for the live data endpoint");
        for _ in 0..self.config.driver.connection_wait_secs {
            if self.client.fetch().await.is_ok() {
                info!("live data endpoint is up");
                self.feed
                    .publish(MatchEvent::lifecycle(LifecycleStage::Connected, None))
                    .await?;
                return Ok(());
            }
            sleep(Duration::from_secs(1)).await;
        }
        Err(BotError::ConnectionTimeout)
    }

    async fn fail(&self, err: BotError) -> MatchOutcome {
        warn!("match attempt failed: {err}");
        if let Err(kill_err) = self.process.kill_game_client().await {
            warn!("could not kill the game client: {kill_err}");
        }
        sleep(Duration::from_secs(self.config.driver.failure_cooldown_secs)).await;
        MatchOutcome::Failed(err)
    }
}
