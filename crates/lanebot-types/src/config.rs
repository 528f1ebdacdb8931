use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{screen::ScreenRatio, BotError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Live-client-data endpoint on the local machine.
    pub live_data_url: String,
    pub request_timeout_secs: u64,
    /// Consecutive poll failures tolerated before the connection is
    /// declared lost.
    pub max_poll_failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Title of the in-game client window.
    pub title: String,
    /// Process image name used when the driver has to kill the game.
    pub game_process: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Minimap spot under the allied mid turret, used for retreats.
    pub minimap_under_turret: ScreenRatio,
    /// Minimap spot at the center of mid lane, pushed during early game.
    pub minimap_center_mid: ScreenRatio,
    /// Minimap spot on the enemy nexus, pushed during late game.
    pub minimap_enemy_nexus: ScreenRatio,
    pub early_lane_travel_secs: u32,
    pub late_lane_travel_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    pub window_wait_secs: u64,
    pub connection_wait_secs: u64,
    pub loading_screen_timeout_secs: u64,
    pub poll_interval_secs: f64,
    /// Pause after a failed match before reporting back, so a broken
    /// client is not immediately relaunched into the same wall.
    pub failure_cooldown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub client: ClientConfig,
    pub window: WindowConfig,
    pub policy: PolicyConfig,
    pub driver: DriverConfig,
    pub ops: OpsConfig,
}

impl BotConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            BotError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            BotError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.client.live_data_url.is_empty() {
            return Err(BotError::Configuration(
                "client.live_data_url must not be empty".into(),
            ));
        }
        if self.client.max_poll_failures == 0 {
            return Err(BotError::Configuration(
                "client.max_poll_failures must be greater than zero".into(),
            ));
        }
        if self.window.title.is_empty() {
            return Err(BotError::Configuration(
                "window.title must not be empty".into(),
            ));
        }
        for (name, ratio) in [
            ("policy.minimap_under_turret", self.policy.minimap_under_turret),
            ("policy.minimap_center_mid", self.policy.minimap_center_mid),
            ("policy.minimap_enemy_nexus", self.policy.minimap_enemy_nexus),
        ] {
            if !ratio.is_normalized() {
                return Err(BotError::Configuration(format!(
                    "{name} must be within the unit square"
                )));
            }
        }
        if self.policy.early_lane_travel_secs == 0 || self.policy.late_lane_travel_secs == 0 {
            return Err(BotError::Configuration(
                "policy lane travel times must be greater than zero".into(),
            ));
        }
        if self.driver.poll_interval_secs <= 0.0 {
            return Err(BotError::Configuration(
                "driver.poll_interval_secs must be positive".into(),
            ));
        }
        if self.driver.window_wait_secs == 0 || self.driver.connection_wait_secs == 0 {
            return Err(BotError::Configuration(
                "driver wait windows must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
