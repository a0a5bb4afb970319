use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::FrameListener;
use crate::platform::Color;

/// Physical display parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Target frame rate. Also sizes the scroller sample window.
    pub fps: u32,
    /// Backdrop color the root container clears to when no wallpaper is set.
    pub background_color: Color,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            fps: 60,
            background_color: Color::BLACK,
        }
    }
}

/// Toolkit configuration handed to [`crate::Display::new`]. Treated as an
/// immutable snapshot for the lifetime of the display.
#[derive(Clone, Default)]
pub struct Config {
    /// Display parameters.
    pub display: DisplayConfig,
    /// An optional listener notified once per frame, before the tree-wide
    /// frame tick.
    pub frame_listener: Option<Arc<dyn FrameListener>>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("display", &self.display)
            .field("frame_listener", &self.frame_listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DisplayConfig::default();
        assert_eq!(cfg.width, 800);
        assert_eq!(cfg.height, 480);
        assert_eq!(cfg.fps, 60);
        assert_eq!(cfg.background_color, Color::BLACK);
    }
}
