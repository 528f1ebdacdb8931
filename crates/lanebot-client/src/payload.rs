//! Serde model of the local live-client-data payload.
//!
//! Only the fields the bot consumes are declared; everything else in the
//! document is ignored.

use serde::Deserialize;

/// Exact event identifier of the enemy mid-lane tier-2 turret. Its death
/// is the early-game to late-game trigger.
pub const MID_OBJECTIVE_ID: &str = "Turret_T2_C_05_A";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllGameData {
    pub game_data: GameData,
    pub active_player: ActivePlayer,
    #[serde(default)]
    pub all_players: Vec<PlayerEntry>,
    #[serde(default)]
    pub events: EventList,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    pub game_time: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePlayer {
    pub summoner_name: String,
    pub current_gold: f64,
    pub champion_stats: ChampionStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    pub current_health: f64,
    pub max_health: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub summoner_name: String,
    pub is_dead: bool,
    pub respawn_timer: f64,
    #[serde(default)]
    pub items: Vec<ItemEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    pub slot: u8,
    pub consumable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventList {
    #[serde(rename = "Events", default)]
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameEvent {
    #[serde(rename = "TurretKilled", default)]
    pub turret_killed: Option<String>,
}

/// Display names carry a `#TAG` suffix the roster entries lack.
pub fn normalized_name(name: &str) -> &str {
    name.split('#').next().unwrap_or(name)
}

impl AllGameData {
    /// Roster entry for the player this client is logged in as.
    pub fn local_player(&self) -> Option<&PlayerEntry> {
        let name = normalized_name(&self.active_player.summoner_name);
        self.all_players.iter().find(|p| p.summoner_name == name)
    }

    pub fn mid_objective_destroyed(&self) -> bool {
        self.events
            .events
            .iter()
            .any(|event| event.turret_killed.as_deref() == Some(MID_OBJECTIVE_ID))
    }
}

impl PlayerEntry {
    /// First consumable in the six real item slots. A populated slot 6
    /// (trinket row full build) without any consumable yields `None`.
    pub fn consumable_slot(&self) -> Option<u8> {
        self.items
            .iter()
            .find(|item| item.consumable && item.slot < 6)
            .map(|item| item.slot)
    }
}
