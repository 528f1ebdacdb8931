use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use lanebot_client::{payload, AllGameData, HttpLiveClient, ScriptedLiveClient};
use lanebot_controller::{
    MockInput, MockProcessControl, ScriptedWindowProbe, ShellProcessControl, ShellWindowProbe,
};
use lanebot_driver::MatchDriver;
use lanebot_feed::{LocalFeed, MatchFeed};
use lanebot_ops::{init_tracing, MatchHistory};
use lanebot_types::{
    config::{
        BotConfig, ClientConfig, DriverConfig, OpsConfig, PolicyConfig, WindowConfig,
    },
    events::EventPayload,
    outcome::MatchOutcome,
    screen::ScreenRatio,
};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lanebot", about = "Plays League of Legends matches unattended")]
struct Cli {
    /// Path to the bot configuration file.
    #[arg(long, default_value = "configs/dev.toml")]
    config: String,
    /// Run against scripted match data instead of a live game client.
    #[arg(long)]
    mock: bool,
    /// Keep starting matches until one fails or a stop is requested.
    #[arg(long = "loop")]
    loop_matches: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    init_tracing(&config.ops)?;

    let feed: Arc<dyn MatchFeed> = Arc::new(LocalFeed::new(64));
    spawn_event_logger(feed.as_ref());

    let (abort_tx, abort_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested, finishing up");
            let _ = abort_tx.send(true);
        }
    });

    let history = MatchHistory::new();
    if cli.mock {
        let mut driver = MatchDriver::new(
            config,
            Arc::new(demo_client()),
            Arc::new(ScriptedWindowProbe::scripted(vec![true], false)),
            MockInput::new(),
            MockProcessControl::new(),
            feed,
            history.clone(),
            abort_rx,
        );
        run_matches(&mut driver, cli.loop_matches).await;
    } else {
        let client = HttpLiveClient::new(&config.client)?;
        let window = ShellWindowProbe::for_window_title(&config.window.title);
        let process = ShellProcessControl::for_process(&config.window.game_process);
        let mut driver = MatchDriver::new(
            config,
            Arc::new(client),
            Arc::new(window),
            MockInput::new(),
            process,
            feed,
            history.clone(),
            abort_rx,
        );
        run_matches(&mut driver, cli.loop_matches).await;
    }

    let records = history.records().await;
    info!(
        matches = records.len(),
        completed = history.completed_count().await,
        "session finished"
    );
    Ok(())
}

async fn run_matches<C, W, I, P>(driver: &mut MatchDriver<C, W, I, P>, loop_matches: bool)
where
    C: lanebot_client::LiveStateClient + 'static,
    W: lanebot_controller::WindowProbe + 'static,
    I: lanebot_controller::GameInput,
    P: lanebot_controller::ProcessControl,
{
    loop {
        let outcome = driver.play_match().await;
        match outcome {
            MatchOutcome::Completed if loop_matches => continue,
            MatchOutcome::Completed => break,
            MatchOutcome::Aborted => break,
            MatchOutcome::Failed(err) => {
                warn!("stopping after a failed match: {err}");
                break;
            }
        }
    }
}

fn spawn_event_logger(feed: &dyn MatchFeed) {
    let mut events = feed.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match &event.payload {
                EventPayload::Lifecycle(lifecycle) => info!(
                    stage = ?lifecycle.stage,
                    details = lifecycle.details.as_deref().unwrap_or("-"),
                    "lifecycle"
                ),
                EventPayload::Phase(change) => info!(
                    from = %change.from,
                    to = %change.to,
                    game_time = change.game_time,
                    "phase change"
                ),
                EventPayload::Ops(ops) => info!(message = %ops.message, "ops"),
            }
        }
    });
}

fn load_config(path: &str) -> BotConfig {
    match BotConfig::from_file(path) {
        Ok(config) => {
            if let Err(err) = config.validate() {
                eprintln!("Invalid config in '{path}': {err}. Falling back to internal defaults.");
                default_config()
            } else {
                config
            }
        }
        Err(err) => {
            eprintln!("Failed to load config from '{path}': {err}. Falling back to internal defaults.");
            default_config()
        }
    }
}

fn default_config() -> BotConfig {
    let config = BotConfig {
        client: ClientConfig {
            live_data_url: "https://127.0.0.1:2999/liveclientdata/allgamedata".into(),
            request_timeout_secs: 10,
            max_poll_failures: 15,
        },
        window: WindowConfig {
            title: "League of Legends (TM) Client".into(),
            game_process: "League of Legends.exe".into(),
        },
        policy: PolicyConfig {
            minimap_under_turret: ScreenRatio::new(0.8760, 0.8846),
            minimap_center_mid: ScreenRatio::new(0.8981, 0.8674),
            minimap_enemy_nexus: ScreenRatio::new(0.9628, 0.7852),
            early_lane_travel_secs: 20,
            late_lane_travel_secs: 30,
        },
        driver: DriverConfig {
            window_wait_secs: 120,
            connection_wait_secs: 120,
            loading_screen_timeout_secs: 600,
            poll_interval_secs: 2.0,
            failure_cooldown_secs: 30,
        },
        ops: OpsConfig {
            log_level: "info".into(),
        },
    };
    debug_assert!(config.validate().is_ok());
    config
}

/// Scripted match for `--mock`: a couple of minutes of early game, the
/// mid turret falling, then the window closing.
fn demo_client() -> ScriptedLiveClient {
    let times: &[(f64, bool)] = &[
        (0.0, false),
        (1.0, false),
        (5.0, false),
        (45.0, false),
        (82.0, false),
        (120.0, false),
        (180.0, true),
        (220.0, true),
        (260.0, true),
    ];
    let frames = times
        .iter()
        .map(|&(game_time, turret_down)| demo_frame(game_time, turret_down))
        .collect();
    ScriptedLiveClient::new(frames)
}

fn demo_frame(game_time: f64, turret_down: bool) -> AllGameData {
    AllGameData {
        game_data: payload::GameData { game_time },
        active_player: payload::ActivePlayer {
            summoner_name: "Lanebot".into(),
            current_gold: 650.0,
            champion_stats: payload::ChampionStats {
                current_health: 1700.0,
                max_health: 2100.0,
            },
        },
        all_players: vec![payload::PlayerEntry {
            summoner_name: "Lanebot".into(),
            is_dead: false,
            respawn_timer: 0.0,
            items: vec![payload::ItemEntry {
                slot: 1,
                consumable: true,
            }],
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
