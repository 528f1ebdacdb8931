use serde::{Deserialize, Serialize};

/// Screen position as fractions of the window dimensions, so clicks land
/// in the same spot at any resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRatio {
    pub x: f64,
    pub y: f64,
}

impl ScreenRatio {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

pub const CENTER_OF_SCREEN: ScreenRatio = ScreenRatio::new(0.5, 0.5);
pub const AFK_OK_BUTTON: ScreenRatio = ScreenRatio::new(0.4981, 0.4647);
pub const SYSTEM_MENU_X_BUTTON: ScreenRatio = ScreenRatio::new(0.7729, 0.2488);
pub const SHOP_PURCHASE_BUTTON: ScreenRatio = ScreenRatio::new(0.7586, 0.8221);

/// Recommended-item buttons on the shop's default tab.
pub const SHOP_ITEM_BUTTONS: [ScreenRatio; 3] = [
    ScreenRatio::new(0.3216, 0.5036),
    ScreenRatio::new(0.4084, 0.5096),
    ScreenRatio::new(0.4943, 0.4928),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_buttons_are_normalized() {
        for ratio in [
            CENTER_OF_SCREEN,
            AFK_OK_BUTTON,
            SYSTEM_MENU_X_BUTTON,
            SHOP_PURCHASE_BUTTON,
        ]
        .into_iter()
        .chain(SHOP_ITEM_BUTTONS)
        {
            assert!(ratio.is_normalized(), "{ratio:?} out of range");
        }
        assert!(!ScreenRatio::new(1.2, 0.5).is_normalized());
    }
}
