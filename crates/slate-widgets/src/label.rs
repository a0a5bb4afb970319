use std::sync::Arc;

use parking_lot::Mutex;
use slate_core::{Canvas, Color, Component, ComponentCore, Font, Platform, Point};

use crate::style::Style;

/// A static text line.
pub struct Label {
    core: ComponentCore,
    text: Mutex<String>,
    font: Font,
    font_size: f32,
    color: Color,
}

impl Label {
    /// Construct a label using the style's default text color and size.
    pub fn new(style: &Arc<Style>, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            core: ComponentCore::default(),
            text: Mutex::new(text.into()),
            font: Font::default(),
            font_size: style.font_size,
            color: style.text_color,
        })
    }

    /// Replace the label text. Takes effect on the next frame.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }

    /// The current text.
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }
}

impl Component for Label {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn draw(&self, canvas: &Canvas, platform: &mut dyn Platform) {
        let (px, py) = canvas.physical_point(0, 0);
        let text = self.text.lock();
        platform.draw_text(
            self.font,
            &text,
            Point::new(px, py),
            self.font_size,
            self.color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::tutils::TestPlatform;

    #[test]
    fn text_roundtrip_and_draw() {
        let style = Arc::new(Style::default());
        let label = Label::new(&style, "hello");
        assert_eq!(label.text(), "hello");
        label.set_text("bye");
        assert_eq!(label.text(), "bye");

        let mut platform = TestPlatform::default();
        let cc = Canvas::new(800, 480);
        label.draw(&cc, &mut platform);
        assert_eq!(platform.texts, 1);
    }
}
