use std::sync::Arc;

use lanebot_client::LiveStateClient;
use lanebot_controller::WindowProbe;
use lanebot_feed::MatchFeed;
use lanebot_types::{
    events::MatchEvent,
    phase::{classify_phase, MatchPhase},
    snapshot::{self, MatchSnapshot, SnapshotSource},
    Result,
};
use tokio::{
    sync::watch,
    time::{sleep, Duration},
};
use tracing::{debug, info};

use crate::fetcher::SnapshotFetcher;

/// Read handle over the latest snapshot. Cheap to clone; every read
/// sees a complete snapshot because the writer replaces it wholesale.
#[derive(Clone)]
pub struct MatchState {
    rx: watch::Receiver<MatchSnapshot>,
}

impl MatchState {
    /// Standalone channel for tests and harnesses that drive the
    /// snapshot by hand instead of through a tracker.
    pub fn channel(initial: MatchSnapshot) -> (watch::Sender<MatchSnapshot>, MatchState) {
        let (tx, rx) = watch::channel(initial);
        (tx, MatchState { rx })
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.rx.borrow().clone()
    }

    pub fn phase(&self) -> MatchPhase {
        self.rx.borrow().phase
    }

    pub fn game_time(&self) -> u32 {
        self.rx.borrow().game_time
    }

    /// False once the writing side is gone, i.e. the poll loop has
    /// stopped and the snapshot will never refresh again. Play-loop
    /// cycles check this so they don't spin on stale facts.
    pub fn live(&self) -> bool {
        self.rx.has_changed().is_ok()
    }
}

impl SnapshotSource for MatchState {
    fn snapshot(&self) -> MatchSnapshot {
        MatchState::snapshot(self)
    }
}

/// Sole writer of the match snapshot. Each successful poll derives a
/// fresh snapshot and publishes it atomically through the watch channel.
pub struct MatchTracker<C, W> {
    fetcher: SnapshotFetcher<C, W>,
    tx: watch::Sender<MatchSnapshot>,
    feed: Arc<dyn MatchFeed>,
}

impl<C, W> MatchTracker<C, W>
where
    C: LiveStateClient,
    W: WindowProbe,
{
    pub fn new(fetcher: SnapshotFetcher<C, W>, feed: Arc<dyn MatchFeed>) -> Self {
        let (tx, _) = watch::channel(MatchSnapshot::default());
        Self { fetcher, tx, feed }
    }

    pub fn state(&self) -> MatchState {
        MatchState {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> MatchSnapshot {
        self.tx.borrow().clone()
    }

    /// Waits `postpone`, polls once, and on success replaces the
    /// snapshot. Returns whether a new snapshot was applied; transient
    /// poll failures leave the previous snapshot untouched.
    pub async fn update(&mut self, postpone: Duration) -> Result<bool> {
        sleep(postpone).await;

        let Some(readout) = self.fetcher.poll().await? else {
            return Ok(false);
        };

        let previous = self.current();
        let objective_destroyed = previous.objective_destroyed || readout.objective_event_seen;
        let phase = classify_phase(readout.game_time, objective_destroyed)?;

        let next = MatchSnapshot {
            game_time: readout.game_time,
            phase,
            objective_destroyed,
            is_dead: readout.is_dead,
            respawn_in: readout.respawn_in,
            health_ratio: readout.health_ratio,
            max_health: readout.max_health,
            low_health: snapshot::is_low_health(readout.health_ratio),
            gold: readout.gold,
            inventory_full: snapshot::inventory_full(readout.gold, readout.item_count),
            consumable_slot: readout.consumable_slot,
            health_delta: previous.health_delta,
        };

        if phase != previous.phase {
            info!(game_time = %next.clock(), "phase is now {phase}");
            self.feed
                .publish(MatchEvent::phase_change(
                    previous.phase,
                    phase,
                    readout.game_time,
                ))
                .await?;
        }

        debug!(
            game_time = next.game_time,
            is_dead = next.is_dead,
            gold = next.gold,
            "snapshot updated"
        );
        self.tx.send_replace(next);
        Ok(true)
    }

    /// Health delta is the poll loop's derivation; it is folded into the
    /// published snapshot under the same write lock as any other update.
    pub fn set_health_delta(&self, delta: f64) {
        self.tx.send_modify(|snap| snap.health_delta = delta);
    }
}

#[cfg(test)]
mod tests {
    use lanebot_client::{payload, AllGameData, ScriptedLiveClient};
    use lanebot_controller::ScriptedWindowProbe;
    use lanebot_feed::LocalFeed;
    use lanebot_types::events::EventKind;

    use super::*;

    fn frame(game_time: f64, turret_down: bool) -> AllGameData {
        AllGameData {
            game_data: payload::GameData { game_time },
            active_player: payload::ActivePlayer {
                summoner_name: "Alice".into(),
                current_gold: 3500.0,
                champion_stats: payload::ChampionStats {
                    current_health: 1200.0,
                    max_health: 2000.0,
                },
            },
            all_players: vec![payload::PlayerEntry {
                summoner_name: "Alice".into(),
                is_dead: false,
                respawn_timer: 0.0,
                items: vec![],
            }],
            events: payload::EventList {
                events: if turret_down {
                    vec![payload::GameEvent {
                        turret_killed: Some(payload::MID_OBJECTIVE_ID.into()),
                    }]
                } else {
                    vec![]
                },
            },
        }
    }

    fn tracker_for(
        frames: Vec<AllGameData>,
    ) -> MatchTracker<ScriptedLiveClient, ScriptedWindowProbe> {
        let client = ScriptedLiveClient::new(frames);
        let fetcher = SnapshotFetcher::new(client, ScriptedWindowProbe::always(true), 15);
        MatchTracker::new(fetcher, Arc::new(LocalFeed::new(16)))
    }

    #[tokio::test(start_paused = true)]
    async fn derives_snapshot_fields() {
        let mut tracker = tracker_for(vec![frame(100.0, false)]);
        let applied = tracker.update(Duration::from_millis(10)).await.unwrap();
        assert!(applied);

        let snap = tracker.current();
        assert_eq!(snap.game_time, 100);
        assert_eq!(snap.phase, MatchPhase::EarlyGame);
        assert!(snap.inventory_full);
        assert!(!snap.low_health);
        assert_eq!(snap.health_ratio, 0.6);
    }

    #[tokio::test(start_paused = true)]
    async fn objective_flag_is_sticky() {
        let mut tracker = tracker_for(vec![
            frame(100.0, false),
            frame(110.0, true),
            frame(120.0, false),
        ]);

        tracker.update(Duration::ZERO).await.unwrap();
        assert!(!tracker.current().objective_destroyed);

        tracker.update(Duration::ZERO).await.unwrap();
        assert!(tracker.current().objective_destroyed);
        assert_eq!(tracker.current().phase, MatchPhase::LateGame);

        // The event no longer appears, but the flag never reverts.
        tracker.update(Duration::ZERO).await.unwrap();
        assert!(tracker.current().objective_destroyed);
        assert_eq!(tracker.current().phase, MatchPhase::LateGame);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_leaves_snapshot_untouched() {
        let client = ScriptedLiveClient::new(vec![frame(100.0, false)]);
        client.push_failure("hiccup");
        let fetcher = SnapshotFetcher::new(client, ScriptedWindowProbe::always(true), 15);
        let mut tracker = MatchTracker::new(fetcher, Arc::new(LocalFeed::new(16)));

        assert!(tracker.update(Duration::ZERO).await.unwrap());
        let before = tracker.current();

        assert!(!tracker.update(Duration::ZERO).await.unwrap());
        let after = tracker.current();
        assert_eq!(before.game_time, after.game_time);
        assert_eq!(before.phase, after.phase);
    }

    #[tokio::test(start_paused = true)]
    async fn phase_transition_is_published_once() {
        use futures::StreamExt;

        let feed = Arc::new(LocalFeed::new(16));
        let mut stream = lanebot_feed::MatchFeed::subscribe(feed.as_ref());

        let client = ScriptedLiveClient::new(vec![frame(100.0, false), frame(105.0, false)]);
        let fetcher = SnapshotFetcher::new(client, ScriptedWindowProbe::always(true), 15);
        let mut tracker = MatchTracker::new(fetcher, feed);

        tracker.update(Duration::ZERO).await.unwrap();
        tracker.update(Duration::ZERO).await.unwrap();

        let event = stream.next().await.expect("transition event");
        assert_eq!(event.kind, EventKind::PhaseChange);
        // Second update stayed in the same phase, so exactly one event.
        assert!(futures::poll!(stream.next()).is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn state_handle_reports_liveness() {
        let tracker = tracker_for(vec![]);
        let state = tracker.state();
        assert!(state.live());
        drop(tracker);
        assert!(!state.live());
    }
}
