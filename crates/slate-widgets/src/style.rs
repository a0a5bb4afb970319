use serde::{Deserialize, Serialize};
use slate_core::Color;

/// Passive styling configuration for the stock widgets.
///
/// A `Style` is shared as an immutable snapshot (`Arc<Style>`) between the
/// widgets constructed from it; to restyle, build a new snapshot and new
/// widgets. It is read from the frame thread's draw callbacks and must never
/// be mutated in place while a display runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    /// Widget frame color.
    pub frame_color: Color,
    /// Light dialog/panel background.
    pub background_light: Color,
    /// Dark dialog/panel background.
    pub background_dark: Color,
    /// Outline color for outlined widgets.
    pub outline_color: Color,
    /// Default text color.
    pub text_color: Color,
    /// Default text size in pixels.
    pub font_size: f32,

    /// Scrollbar color on light backgrounds.
    pub scroll_bar_dark_color: Color,
    /// Scrollbar color on dark backgrounds.
    pub scroll_bar_light_color: Color,
    /// Scrollbar thumb thickness, millimeters.
    pub scroll_bar_thickness_mm: f32,
    /// Gap between the thumb and the pane edge, millimeters.
    pub scroll_bar_offset_mm: f32,
    /// How long scrollbars stay visible after the pointer releases.
    pub scroll_bar_disappear_millis: i64,

    /// Noise radius for button presses, pixels.
    pub button_press_radius: f32,

    /// Pixels per centimeter of the target screen, for millimeter-specified
    /// dimensions.
    pub ppcm: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            frame_color: Color::rgb(90, 90, 90),
            background_light: Color::rgb(64, 64, 64),
            background_dark: Color::rgb(32, 32, 32),
            outline_color: Color::rgb(140, 140, 140),
            text_color: Color::WHITE,
            font_size: 30.0,
            scroll_bar_dark_color: Color::rgba(40, 40, 40, 200),
            scroll_bar_light_color: Color::rgba(220, 220, 220, 200),
            scroll_bar_thickness_mm: 2.0,
            scroll_bar_offset_mm: 1.0,
            scroll_bar_disappear_millis: 1500,
            button_press_radius: 20.0,
            ppcm: 47.0,
        }
    }
}

impl Style {
    /// Convert a millimeter dimension to pixels for this style's screen.
    pub fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.ppcm / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mm_to_px() {
        let s = Style {
            ppcm: 50.0,
            ..Style::default()
        };
        assert_eq!(s.mm_to_px(2.0), 10.0);
    }
}
