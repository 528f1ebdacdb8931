use serde::{Deserialize, Serialize};

use crate::phase::MatchPhase;

/// Gold threshold above which a shop trip is worthwhile.
pub const SHOPPING_GOLD: f64 = 3000.0;
/// Item slots including the trinket slot; at seven the build is done.
pub const ITEM_SLOT_CAPACITY: usize = 7;

const LOW_HEALTH_FLOOR: f64 = 0.01;
const LOW_HEALTH_CEILING: f64 = 0.3;

/// Immutable record of derived match facts as of the most recent
/// successful poll. Replaced wholesale by the tracker; never mutated
/// field by field across tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Elapsed game time in whole seconds, monotonically non-decreasing.
    pub game_time: u32,
    pub phase: MatchPhase,
    /// Sticky: once the mid objective falls this never reverts.
    pub objective_destroyed: bool,
    pub is_dead: bool,
    /// Seconds until respawn, as reported by the endpoint.
    pub respawn_in: f64,
    /// Current health over max health, in `[0, 1]`.
    pub health_ratio: f64,
    pub max_health: f64,
    pub low_health: bool,
    pub gold: f64,
    /// True when gold is banked and an item slot is still open, i.e. a
    /// shop trip would actually buy something.
    pub inventory_full: bool,
    /// First consumable in slots 0-5, `None` on a full build or when no
    /// consumable is held.
    pub consumable_slot: Option<u8>,
    /// Previous health ratio minus current, written only by the poll loop.
    pub health_delta: f64,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self {
            game_time: 0,
            phase: MatchPhase::LoadingScreen,
            objective_destroyed: false,
            is_dead: false,
            respawn_in: 0.0,
            health_ratio: 1.0,
            max_health: 0.0,
            low_health: false,
            gold: 0.0,
            inventory_full: false,
            consumable_slot: None,
            health_delta: 0.0,
        }
    }
}

impl MatchSnapshot {
    /// Game time formatted as `mm:ss` for logs.
    pub fn clock(&self) -> String {
        format_clock(self.game_time)
    }
}

/// Read access to the latest snapshot, implemented by the live match
/// state handle. Input primitives take this so a long hold can cut
/// itself short when the player dies or the phase moves on.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> MatchSnapshot;
}

/// Low health is an exclusive band: a ratio of exactly 0 (dead but not
/// yet flagged dead) or a hair above zero reads as parse noise, not as
/// a retreat trigger.
pub fn is_low_health(health_ratio: f64) -> bool {
    health_ratio > LOW_HEALTH_FLOOR && health_ratio < LOW_HEALTH_CEILING
}

pub fn inventory_full(gold: f64, item_count: usize) -> bool {
    gold > SHOPPING_GOLD && item_count < ITEM_SLOT_CAPACITY
}

pub fn format_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_health_band_is_exclusive() {
        assert!(!is_low_health(0.0));
        assert!(!is_low_health(0.01));
        assert!(is_low_health(0.011));
        assert!(is_low_health(0.15));
        assert!(is_low_health(0.299));
        assert!(!is_low_health(0.3));
        assert!(!is_low_health(1.0));
    }

    #[test]
    fn shop_trip_requires_gold_and_an_open_slot() {
        assert!(inventory_full(3500.0, 6));
        assert!(!inventory_full(3500.0, 7));
        assert!(!inventory_full(3000.0, 6));
        assert!(!inventory_full(100.0, 0));
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(629), "10:29");
    }
}
