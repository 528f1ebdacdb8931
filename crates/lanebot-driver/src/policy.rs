use lanebot_controller::GameInput;
use lanebot_state::MatchState;
use lanebot_types::{
    abilities::UpgradeOrder,
    config::PolicyConfig,
    phase::{MatchPhase, LOADING_SCREEN_END_SECS},
    screen::{
        AFK_OK_BUTTON, CENTER_OF_SCREEN, SHOP_ITEM_BUTTONS, SHOP_PURCHASE_BUTTON,
        SYSTEM_MENU_X_BUTTON,
    },
    BotError, Result,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{
    sync::watch,
    time::{sleep, Duration, Instant},
};
use tracing::{debug, info};

/// Which map structure the current phase pushes toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneObjective {
    CenterMid,
    EnemyNexus,
}

/// Health ratio below which attack bursts shorten.
const SHORT_BURST_HEALTH: f64 = 0.6;
/// Squishy champions get short bursts regardless of current health.
const SHORT_BURST_MAX_HEALTH: f64 = 1000.0;
/// Consumables are popped under this health ratio.
const CONSUMABLE_HEALTH: f64 = 0.75;

/// Scripted play behavior for one match. Owns the bits of state that
/// live across phase dispatches: the ability rotation, whether the
/// champion is standing in lane, and whether the camera is locked.
pub struct ActionPolicy<'a, I: GameInput> {
    input: &'a I,
    state: MatchState,
    config: PolicyConfig,
    loading_timeout: Duration,
    abort: watch::Receiver<bool>,
    upgrades: UpgradeOrder,
    rng: StdRng,
    in_lane: bool,
    screen_locked: bool,
}

impl<'a, I: GameInput> ActionPolicy<'a, I> {
    pub fn new(
        input: &'a I,
        state: MatchState,
        config: PolicyConfig,
        loading_timeout: Duration,
        abort: watch::Receiver<bool>,
    ) -> Self {
        Self {
            input,
            state,
            config,
            loading_timeout,
            abort,
            upgrades: UpgradeOrder::default(),
            rng: StdRng::from_entropy(),
            in_lane: false,
            screen_locked: false,
        }
    }

    fn aborted(&self) -> bool {
        *self.abort.borrow()
    }

    fn idle(&self) -> bool {
        self.aborted() || !self.state.live()
    }

    /// Waits out the loading screen, clicking periodically to dismiss
    /// any dialog sitting over the game.
    pub async fn loading_screen(&mut self) -> Result<()> {
        info!("in loading screen, waiting for the match to start");
        let started = Instant::now();
        while self.state.game_time() < LOADING_SCREEN_END_SECS {
            if started.elapsed() > self.loading_timeout {
                return Err(BotError::LoadingTimeout);
            }
            if self.idle() {
                return Ok(());
            }
            self.input.click(CENTER_OF_SCREEN, 2.0).await?;
        }
        self.input.click(CENTER_OF_SCREEN, 2.0).await?;
        Ok(())
    }

    /// Opening routine: starter items, camera lock, first skill point,
    /// then anti-idle motions until minions are about to clash.
    pub async fn opening(&mut self) -> Result<()> {
        info!("match started, waiting for minions");
        sleep(Duration::from_secs(7)).await;
        self.buy_items().await?;
        self.lock_screen().await?;
        self.upgrade_abilities().await?;

        while self.state.phase() == MatchPhase::PreMinions && !self.idle() {
            self.input
                .right_click(self.config.minimap_under_turret, 2.0)
                .await?;
            self.input.click(AFK_OK_BUTTON, 0.0).await?;
        }
        self.in_lane = true;
        Ok(())
    }

    /// One lane cycle: travel if needed, then attack bursts with short
    /// de-aggro retreats until it is time to shop, retreat, or respawn.
    pub async fn play(&mut self, objective: LaneObjective, travel_secs: u32) -> Result<()> {
        debug!(phase = %self.state.phase(), ?objective, "lane cycle");
        let attack = match objective {
            LaneObjective::CenterMid => self.config.minimap_center_mid,
            LaneObjective::EnemyNexus => self.config.minimap_enemy_nexus,
        };
        let retreat = self.config.minimap_under_turret;

        self.input.click(AFK_OK_BUTTON, 0.0).await?;

        if self.state.snapshot().is_dead {
            return self.death_wait().await;
        }

        if !self.in_lane {
            // Ghost makes the walk back to lane quicker.
            self.input.press("d", 0.0).await?;
            self.input
                .attack_move(attack, f64::from(travel_secs), &self.state)
                .await?;
            self.in_lane = true;
        }

        loop {
            let snap = self.state.snapshot();
            if snap.inventory_full || snap.low_health {
                break;
            }
            if self.idle() {
                return Ok(());
            }
            if snap.is_dead {
                return self.death_wait().await;
            }
            // Once the mid turret falls the dispatch loop retargets the
            // nexus; no point finishing a cycle aimed at the old spot.
            if objective == LaneObjective::CenterMid && snap.phase == MatchPhase::LateGame {
                return Ok(());
            }

            let burst_secs = attack_window(snap.health_ratio, snap.max_health, &mut self.rng);
            self.input
                .attack_move(attack, burst_secs, &self.state)
                .await?;
            self.input
                .right_click(retreat, (burst_secs / 8.0).min(1.0))
                .await?;

            if let Some(slot) = snap.consumable_slot {
                if snap.health_ratio < CONSUMABLE_HEALTH {
                    self.input.press(&(slot + 1).to_string(), 0.0).await?;
                }
            }
            debug!(
                needs_shopping = snap.inventory_full,
                low_health = snap.low_health,
                "attack cycle complete"
            );
        }

        // Flash away from whatever is chasing, then reset at the shop.
        self.input.press("f", 0.0).await?;
        self.back_to_base().await
    }

    /// Spends the death timer on shopping and skill points.
    async fn death_wait(&mut self) -> Result<()> {
        let snap = self.state.snapshot();
        debug!(respawn_in = snap.respawn_in, "dead, waiting to respawn");
        self.buy_items().await?;
        self.upgrade_abilities().await?;
        if snap.respawn_in > 1.0 {
            sleep(Duration::from_secs_f64(snap.respawn_in)).await;
        }
        self.in_lane = false;
        Ok(())
    }

    async fn back_to_base(&mut self) -> Result<()> {
        let snap = self.state.snapshot();
        debug!(
            gold = snap.gold,
            low_health = snap.low_health,
            "returning to base"
        );
        self.input
            .right_click(self.config.minimap_under_turret, 5.0)
            .await?;
        self.input.press("b", 9.0).await?;
        self.in_lane = false;
        self.buy_items().await?;
        self.upgrade_abilities().await?;
        Ok(())
    }

    /// Opens the shop and buys from the recommended tab via fixed
    /// button positions.
    async fn buy_items(&mut self) -> Result<()> {
        debug!("buying from the recommended shop tab");
        self.input.press("p", 1.0).await?;
        let button = SHOP_ITEM_BUTTONS[self.rng.gen_range(0..SHOP_ITEM_BUTTONS.len())];
        self.input.click(button, 1.0).await?;
        self.input.click(SHOP_PURCHASE_BUTTON, 1.0).await?;
        self.input.press("esc", 1.0).await?;
        self.input.click(SYSTEM_MENU_X_BUTTON, 1.0).await?;
        Ok(())
    }

    async fn lock_screen(&mut self) -> Result<()> {
        if !self.screen_locked {
            debug!("locking camera on champion");
            self.input.press("y", 0.0).await?;
            self.screen_locked = true;
        }
        Ok(())
    }

    /// Attempts all four skill points, then rotates which basic ability
    /// gets priority next time.
    async fn upgrade_abilities(&mut self) -> Result<()> {
        debug!(order = ?self.upgrades.keys(), "upgrading abilities");
        for key in self.upgrades.keys() {
            self.input.press(key.hotkey(), 0.0).await?;
        }
        self.upgrades.rotate();
        Ok(())
    }
}

/// Length of the next attack burst. Weak or squishy champions commit
/// for less time so they can peel off before dying.
pub fn attack_window(health_ratio: f64, max_health: f64, rng: &mut impl Rng) -> f64 {
    if health_ratio < SHORT_BURST_HEALTH || max_health < SHORT_BURST_MAX_HEALTH {
        rng.gen_range(4.0..6.0)
    } else {
        rng.gen_range(6.0..12.0)
    }
}

#[cfg(test)]
mod tests {
    use lanebot_controller::{InputAction, MockInput};
    use lanebot_types::{config::PolicyConfig, screen::ScreenRatio, snapshot::MatchSnapshot};

    use super::*;

    fn policy_config() -> PolicyConfig {
        PolicyConfig {
            minimap_under_turret: ScreenRatio::new(0.8760, 0.8846),
            minimap_center_mid: ScreenRatio::new(0.8981, 0.8674),
            minimap_enemy_nexus: ScreenRatio::new(0.9628, 0.7852),
            early_lane_travel_secs: 20,
            late_lane_travel_secs: 30,
        }
    }

    struct Harness {
        state_tx: watch::Sender<MatchSnapshot>,
        _abort_tx: watch::Sender<bool>,
    }

    fn policy_over<'a>(
        input: &'a MockInput,
        snapshot: MatchSnapshot,
    ) -> (Harness, ActionPolicy<'a, MockInput>) {
        let (state_tx, state) = MatchState::channel(snapshot);
        let (abort_tx, abort_rx) = watch::channel(false);
        let policy = ActionPolicy::new(
            input,
            state,
            policy_config(),
            Duration::from_secs(600),
            abort_rx,
        );
        (
            Harness {
                state_tx,
                _abort_tx: abort_tx,
            },
            policy,
        )
    }

    #[test]
    fn attack_window_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let short = attack_window(0.5, 2000.0, &mut rng);
            assert!((4.0..6.0).contains(&short), "short burst {short}");

            let squishy = attack_window(0.9, 800.0, &mut rng);
            assert!((4.0..6.0).contains(&squishy), "squishy burst {squishy}");

            let long = attack_window(0.9, 2000.0, &mut rng);
            assert!((6.0..12.0).contains(&long), "long burst {long}");
        }
    }

    #[test]
    fn boundary_health_gets_long_bursts() {
        let mut rng = StdRng::seed_from_u64(7);
        let burst = attack_window(0.6, 1000.0, &mut rng);
        assert!(burst >= 6.0);
    }

    #[tokio::test(start_paused = true)]
    async fn death_wait_shops_and_clears_lane_flag() {
        let input = MockInput::new();
        let dead = MatchSnapshot {
            is_dead: true,
            respawn_in: 20.0,
            ..MatchSnapshot::default()
        };
        let (_harness, mut policy) = policy_over(&input, dead);
        policy.in_lane = true;

        let before = Instant::now();
        policy.play(LaneObjective::CenterMid, 20).await.unwrap();

        assert!(!policy.in_lane);
        // Shop hotkey and at least one ctrl-upgrade were pressed.
        let actions = input.actions();
        assert!(actions.iter().any(|a| matches!(
            a,
            InputAction::Press { key, .. } if key == "p"
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            InputAction::Press { key, .. } if key == "ctrl+r"
        )));
        // The respawn timer was actually waited out.
        assert!(before.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn low_health_cycle_escapes_and_resets() {
        let input = MockInput::new();
        let hurt = MatchSnapshot {
            health_ratio: 0.2,
            low_health: true,
            max_health: 2000.0,
            ..MatchSnapshot::default()
        };
        let (_harness, mut policy) = policy_over(&input, hurt);
        policy.in_lane = true;

        policy.play(LaneObjective::EnemyNexus, 30).await.unwrap();

        let actions = input.actions();
        assert!(actions.iter().any(|a| matches!(
            a,
            InputAction::Press { key, .. } if key == "f"
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            InputAction::Press { key, .. } if key == "b"
        )));
        assert!(!policy.in_lane);
    }

    #[tokio::test(start_paused = true)]
    async fn early_cycle_yields_once_late_game_begins() {
        let input = MockInput::new();
        let late = MatchSnapshot {
            phase: MatchPhase::LateGame,
            health_ratio: 0.9,
            max_health: 2000.0,
            ..MatchSnapshot::default()
        };
        let (_harness, mut policy) = policy_over(&input, late);
        policy.in_lane = true;

        policy.play(LaneObjective::CenterMid, 20).await.unwrap();

        // No burst was issued toward the stale objective.
        assert!(!input
            .actions()
            .iter()
            .any(|a| matches!(a, InputAction::AttackMove { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn travels_to_lane_with_ghost_before_fighting() {
        let input = MockInput::new();
        let fresh = MatchSnapshot {
            phase: MatchPhase::EarlyGame,
            health_ratio: 1.0,
            max_health: 2000.0,
            low_health: true, // exit the cycle right after arriving
            ..MatchSnapshot::default()
        };
        let (_harness, mut policy) = policy_over(&input, fresh);
        assert!(!policy.in_lane);

        policy.play(LaneObjective::CenterMid, 20).await.unwrap();

        let actions = input.actions();
        let ghost = actions.iter().position(|a| matches!(
            a,
            InputAction::Press { key, .. } if key == "d"
        ));
        let travel = actions
            .iter()
            .position(|a| matches!(a, InputAction::AttackMove { .. }));
        assert!(ghost.is_some() && travel.is_some());
        assert!(ghost < travel);
    }

    #[tokio::test(start_paused = true)]
    async fn consumable_used_when_hurt() {
        let input = MockInput::new();
        let hurt = MatchSnapshot {
            phase: MatchPhase::LateGame,
            health_ratio: 0.5,
            max_health: 2000.0,
            consumable_slot: Some(1),
            ..MatchSnapshot::default()
        };
        let (harness, mut policy) = policy_over(&input, hurt.clone());
        policy.in_lane = true;

        // Let one cycle run, then force the loop to exit.
        let play = policy.play(LaneObjective::EnemyNexus, 30);
        tokio::pin!(play);
        let _ = tokio::time::timeout(Duration::from_secs(8), &mut play).await;
        harness
            .state_tx
            .send(MatchSnapshot {
                low_health: true,
                health_ratio: 0.2,
                ..hurt
            })
            .unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(60), &mut play).await;

        // Slot 1 maps to hotkey "2".
        assert!(input.actions().iter().any(|a| matches!(
            a,
            InputAction::Press { key, .. } if key == "2"
        )));
    }
}
