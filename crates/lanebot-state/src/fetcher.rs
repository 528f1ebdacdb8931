use lanebot_client::{AllGameData, LiveStateClient};
use lanebot_controller::WindowProbe;
use lanebot_types::{BotError, Result};
use tracing::debug;

/// Facts about the local player parsed out of one successful poll.
/// Derivations that need history (sticky objective flag, phase, health
/// delta) belong to the tracker, not here.
#[derive(Debug, Clone)]
pub struct PlayerReadout {
    pub game_time: u32,
    pub is_dead: bool,
    pub respawn_in: f64,
    pub health_ratio: f64,
    pub max_health: f64,
    pub gold: f64,
    pub item_count: usize,
    pub consumable_slot: Option<u8>,
    pub objective_event_seen: bool,
}

/// Polls the live endpoint and classifies failures.
///
/// Transient failures are counted; the counter resets on any success.
/// Two conditions escalate to fatal: the game window vanishing during a
/// failure, and the failure count reaching its threshold.
pub struct SnapshotFetcher<C, W> {
    client: C,
    window: W,
    failures: u32,
    max_failures: u32,
}

impl<C, W> SnapshotFetcher<C, W>
where
    C: LiveStateClient,
    W: WindowProbe,
{
    pub fn new(client: C, window: W, max_failures: u32) -> Self {
        Self {
            client,
            window,
            failures: 0,
            max_failures,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// One poll. `Ok(None)` is a transient failure the caller should
    /// retry after its usual delay.
    pub async fn poll(&mut self) -> Result<Option<PlayerReadout>> {
        let data = match self.client.fetch().await {
            Ok(data) => data,
            Err(err) => {
                debug!("poll failed: {err}");
                return self.transient().await;
            }
        };

        // The roster can briefly lack the local player while the match
        // is assembling; retry like any other poll hiccup.
        let Some(readout) = readout(&data) else {
            debug!(
                "no roster entry for {}",
                data.active_player.summoner_name
            );
            return self.transient().await;
        };

        self.failures = 0;
        Ok(Some(readout))
    }

    async fn transient(&mut self) -> Result<Option<PlayerReadout>> {
        self.failures += 1;
        if !self.window.exists().await {
            return Err(BotError::WindowLost);
        }
        if self.failures >= self.max_failures {
            return Err(BotError::ConnectionLost);
        }
        Ok(None)
    }
}

fn readout(data: &AllGameData) -> Option<PlayerReadout> {
    let player = data.local_player()?;

    let stats = &data.active_player.champion_stats;
    // Guards against a zero max health in the first frames of a match.
    let health_ratio = if stats.max_health > 0.0 {
        stats.current_health / stats.max_health
    } else {
        0.0
    };

    Some(PlayerReadout {
        game_time: data.game_data.game_time as u32,
        is_dead: player.is_dead,
        respawn_in: player.respawn_timer,
        health_ratio,
        max_health: stats.max_health,
        gold: data.active_player.current_gold,
        item_count: player.items.len(),
        consumable_slot: player.consumable_slot(),
        objective_event_seen: data.mid_objective_destroyed(),
    })
}

#[cfg(test)]
mod tests {
    use lanebot_client::{payload, ScriptedLiveClient};
    use lanebot_controller::ScriptedWindowProbe;

    use super::*;

    fn frame(game_time: f64) -> AllGameData {
        AllGameData {
            game_data: payload::GameData { game_time },
            active_player: payload::ActivePlayer {
                summoner_name: "Alice#NA1".into(),
                current_gold: 500.0,
                champion_stats: payload::ChampionStats {
                    current_health: 580.0,
                    max_health: 580.0,
                },
            },
            all_players: vec![payload::PlayerEntry {
                summoner_name: "Alice".into(),
                is_dead: false,
                respawn_timer: 0.0,
                items: vec![],
            }],
            events: payload::EventList::default(),
        }
    }

    fn fetcher_with(
        client: ScriptedLiveClient,
        window_exists: bool,
    ) -> SnapshotFetcher<ScriptedLiveClient, ScriptedWindowProbe> {
        SnapshotFetcher::new(client, ScriptedWindowProbe::always(window_exists), 15)
    }

    #[tokio::test]
    async fn success_resets_failure_counter() {
        let client = ScriptedLiveClient::default();
        for _ in 0..14 {
            client.push_failure("hiccup");
        }
        client.push_frame(frame(120.0));

        let mut fetcher = fetcher_with(client, true);
        for expected in 1..=14 {
            let result = fetcher.poll().await.expect("transient, not fatal");
            assert!(result.is_none());
            assert_eq!(fetcher.consecutive_failures(), expected);
        }

        let readout = fetcher.poll().await.unwrap().expect("successful poll");
        assert_eq!(fetcher.consecutive_failures(), 0);
        assert_eq!(readout.game_time, 120);
    }

    #[tokio::test]
    async fn fifteenth_failure_is_fatal() {
        let client = ScriptedLiveClient::default();
        for _ in 0..15 {
            client.push_failure("hiccup");
        }

        let mut fetcher = fetcher_with(client, true);
        for _ in 0..14 {
            assert!(fetcher.poll().await.unwrap().is_none());
        }
        let err = fetcher.poll().await.unwrap_err();
        assert!(matches!(err, BotError::ConnectionLost));
    }

    #[tokio::test]
    async fn missing_window_outranks_the_counter() {
        let client = ScriptedLiveClient::default();
        client.push_failure("hiccup");

        let mut fetcher = fetcher_with(client, false);
        let err = fetcher.poll().await.unwrap_err();
        assert!(matches!(err, BotError::WindowLost));
    }

    #[tokio::test]
    async fn readout_carries_player_facts() {
        let mut data = frame(612.0);
        data.active_player.champion_stats.current_health = 400.0;
        data.active_player.champion_stats.max_health = 1600.0;
        data.all_players[0].items = vec![
            payload::ItemEntry {
                slot: 0,
                consumable: false,
            },
            payload::ItemEntry {
                slot: 1,
                consumable: true,
            },
        ];

        let client = ScriptedLiveClient::new(vec![data]);
        let mut fetcher = fetcher_with(client, true);
        let readout = fetcher.poll().await.unwrap().unwrap();
        assert_eq!(readout.game_time, 612);
        assert_eq!(readout.health_ratio, 0.25);
        assert_eq!(readout.item_count, 2);
        assert_eq!(readout.consumable_slot, Some(1));
        assert!(!readout.objective_event_seen);
    }

    #[tokio::test]
    async fn missing_roster_entry_is_transient() {
        let mut incomplete = frame(10.0);
        incomplete.all_players.clear();

        let client = ScriptedLiveClient::new(vec![incomplete, frame(12.0)]);
        let mut fetcher = fetcher_with(client, true);

        // Roster miss counts like any other poll hiccup.
        assert!(fetcher.poll().await.unwrap().is_none());
        assert_eq!(fetcher.consecutive_failures(), 1);

        // A complete frame recovers and resets the counter.
        let readout = fetcher.poll().await.unwrap().expect("complete frame");
        assert_eq!(readout.game_time, 12);
        assert_eq!(fetcher.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn persistent_roster_miss_escalates() {
        let client = ScriptedLiveClient::default();
        for _ in 0..15 {
            let mut incomplete = frame(10.0);
            incomplete.all_players.clear();
            client.push_frame(incomplete);
        }

        let mut fetcher = fetcher_with(client, true);
        for _ in 0..14 {
            assert!(fetcher.poll().await.unwrap().is_none());
        }
        let err = fetcher.poll().await.unwrap_err();
        assert!(matches!(err, BotError::ConnectionLost));
    }
}
