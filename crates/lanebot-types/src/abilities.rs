use serde::{Deserialize, Serialize};

/// Ability hotkeys pressed with ctrl held to spend a skill point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKey {
    Ultimate,
    Q,
    W,
    E,
}

impl AbilityKey {
    pub fn hotkey(self) -> &'static str {
        match self {
            AbilityKey::Ultimate => "ctrl+r",
            AbilityKey::Q => "ctrl+q",
            AbilityKey::W => "ctrl+w",
            AbilityKey::E => "ctrl+e",
        }
    }
}

/// Order in which skill points are attempted each time the bot levels up.
///
/// The ultimate stays first; after every use the tail rotates so the
/// basic ability that just had priority goes to the back. Over three
/// uses this round-robins Q, W and E evenly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOrder {
    keys: [AbilityKey; 4],
}

impl Default for UpgradeOrder {
    fn default() -> Self {
        Self {
            keys: [AbilityKey::Ultimate, AbilityKey::Q, AbilityKey::W, AbilityKey::E],
        }
    }
}

impl UpgradeOrder {
    pub fn keys(&self) -> &[AbilityKey; 4] {
        &self.keys
    }

    /// Rotate the three basic abilities, keeping the ultimate in front.
    pub fn rotate(&mut self) {
        let [first, second, third, fourth] = self.keys;
        self.keys = [first, fourth, second, third];
    }
}
