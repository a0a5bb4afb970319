use std::sync::Arc;

use parking_lot::Mutex;
use slate_core::{
    Canvas, Color, Component, ComponentCore, Font, Platform, Point, Presser, Rect, TouchHandler,
};

use crate::style::Style;

/// Per-button appearance.
#[derive(Debug, Clone, Copy)]
pub struct ButtonStyle {
    /// Text font.
    pub font: Font,
    /// Text size in pixels.
    pub font_size: f32,
    /// Fill color at rest.
    pub color: Color,
    /// Fill color while pressed.
    pub select_color: Color,
    /// Text color.
    pub text_color: Color,
    /// Optional outline drawn behind the fill.
    pub outline_color: Option<Color>,
    /// Corner roundness, 0.0 square to 1.0 capsule.
    pub roundness: f32,
    /// Noise radius for the press gesture, pixels.
    pub press_radius: f32,
    /// Delay before a touch registers as a press, milliseconds.
    pub press_delay_millis: i64,
}

impl ButtonStyle {
    /// The standard button look for a style snapshot.
    pub fn dialog(style: &Style) -> Self {
        Self {
            font: Font::default(),
            font_size: style.font_size,
            color: style.background_dark,
            select_color: style.background_light,
            text_color: style.text_color,
            outline_color: Some(style.outline_color),
            roundness: 0.25,
            press_radius: style.button_press_radius,
            press_delay_millis: 0,
        }
    }
}

/// A push button. Owns a [`Presser`] and forwards its touch capability to
/// it; the click callback fires when a press ends inside the noise radius.
pub struct Button {
    core: ComponentCore,
    presser: Presser,
    style: ButtonStyle,
    text: Mutex<String>,
}

impl Button {
    /// Construct a button with a click callback.
    pub fn new(
        style: ButtonStyle,
        text: impl Into<String>,
        on_click: impl Fn() + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            core: ComponentCore::default(),
            presser: Presser::new(style.press_radius, style.press_delay_millis, on_click),
            style,
            text: Mutex::new(text.into()),
        })
    }

    /// Whether the button is visually pressed right now.
    pub fn pressed(&self) -> bool {
        self.presser.pressed()
    }

    /// Replace the button text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }
}

impl Component for Button {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn draw(&self, canvas: &Canvas, platform: &mut dyn Platform) {
        let b = self.bounds();
        let (px, py) = canvas.physical_point(0, 0);
        if let Some(outline) = self.style.outline_color {
            platform.fill_rounded_rect(
                Rect::new(px - 1, py - 1, b.w + 2, b.h + 2),
                self.style.roundness,
                outline,
            );
        }
        let fill = if self.pressed() {
            self.style.select_color
        } else {
            self.style.color
        };
        platform.fill_rounded_rect(Rect::new(px, py, b.w, b.h), self.style.roundness, fill);

        let text = self.text.lock();
        let measured = platform.measure_text(self.style.font, &text, self.style.font_size);
        let tx = px + (b.w - measured.x as i32) / 2;
        let ty = py + (b.h - measured.y as i32) / 2;
        platform.draw_text(
            self.style.font,
            &text,
            Point::new(tx, ty),
            self.style.font_size,
            self.style.text_color,
        );
    }

    fn as_touch_handler(&self) -> Option<&dyn TouchHandler> {
        Some(&self.presser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::tutils::TestPlatform;
    use slate_core::{TouchPhase, TouchResponse, TouchSample, Vec2};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample(phase: TouchPhase, pos: Vec2, millis: i64, seq: i64) -> TouchSample {
        TouchSample {
            phase,
            pos,
            millis,
            seq,
        }
    }

    #[test]
    fn click_fires_once_per_press() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let c2 = clicks.clone();
        let style = Style::default();
        let button = Button::new(ButtonStyle::dialog(&style), "ok", move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        let handler = button.as_touch_handler().unwrap();
        assert_eq!(
            handler.on_touch(sample(TouchPhase::Pressed, Vec2::new(5.0, 5.0), 0, 1)),
            TouchResponse::Lock
        );
        assert!(button.pressed());
        assert_eq!(
            handler.on_touch(sample(TouchPhase::Released, Vec2::new(5.0, 5.0), 16, 2)),
            TouchResponse::Pass
        );
        assert!(!button.pressed());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);

        // Sliding out of the noise radius cancels the click.
        assert_eq!(
            handler.on_touch(sample(TouchPhase::Pressed, Vec2::new(5.0, 5.0), 32, 3)),
            TouchResponse::Lock
        );
        assert_eq!(
            handler.on_touch(sample(TouchPhase::Moving, Vec2::new(100.0, 100.0), 48, 4)),
            TouchResponse::Pass
        );
        assert_eq!(
            handler.on_touch(sample(TouchPhase::Released, Vec2::new(100.0, 100.0), 64, 5)),
            TouchResponse::Pass
        );
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn draw_renders_fill_and_text() {
        let style = Style::default();
        let button = Button::new(ButtonStyle::dialog(&style), "ok", || {});
        button.set_bounds(Rect::new(10, 10, 120, 40));

        let mut platform = TestPlatform::default();
        let cc = Canvas::new(800, 480);
        button.draw(&cc, &mut platform);
        // Outline plus fill.
        assert_eq!(platform.rounded_rects, 2);
        assert_eq!(platform.texts, 1);
    }
}
