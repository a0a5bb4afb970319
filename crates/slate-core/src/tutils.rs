//! Test doubles for exercising the display loop headless.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use geom::{Point, Rect, Vec2};

use crate::config::DisplayConfig;
use crate::error::Result;
use crate::platform::{Color, Font, Platform, Texture};

/// A scripted [`Platform`] that replaces the real display and input device.
///
/// Input is driven by assigning the public `touch_*` fields between frames;
/// drawing is recorded in counters. The close flag is shared through an
/// `Arc` so a frame listener (or another thread) can stop a running loop.
pub struct TestPlatform {
    /// Scripted pointer-button state.
    pub touch_down: bool,
    /// Scripted pointer position.
    pub touch_pos: Vec2,
    /// Scripted pointer movement since the previous frame.
    pub touch_delta: Vec2,
    /// When set, `window_should_close` reports true.
    pub close: Arc<AtomicBool>,
    /// Number of frames bracketed by `begin_drawing`.
    pub frames: u64,
    /// Every scissor rectangle installed, in order.
    pub scissors: Vec<Rect>,
    /// Number of `end_scissor` calls.
    pub scissor_ends: u64,
    /// Number of `clear` calls.
    pub clears: u64,
    /// Number of `fill_rect` calls.
    pub rects: u64,
    /// Number of `fill_rounded_rect` calls.
    pub rounded_rects: u64,
    /// Number of `draw_text` calls.
    pub texts: u64,
    /// Number of `draw_texture` calls.
    pub textures: u64,
    next_texture_id: u32,
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self {
            touch_down: false,
            touch_pos: Vec2::default(),
            touch_delta: Vec2::default(),
            close: Arc::new(AtomicBool::new(false)),
            frames: 0,
            scissors: Vec::new(),
            scissor_ends: 0,
            clears: 0,
            rects: 0,
            rounded_rects: 0,
            texts: 0,
            textures: 0,
            next_texture_id: 1,
        }
    }
}

impl TestPlatform {
    /// A platform whose close flag is shared with the caller, so a frame
    /// listener or another thread can stop a running loop.
    pub fn with_close(close: Arc<AtomicBool>) -> Self {
        Self {
            close,
            ..Self::default()
        }
    }
}

impl Platform for TestPlatform {
    fn init(&mut self, _cfg: &DisplayConfig) {}

    fn close_window(&mut self) {
        self.close.store(true, Ordering::Release);
    }

    fn window_should_close(&self) -> bool {
        self.close.load(Ordering::Acquire)
    }

    fn begin_drawing(&mut self) {
        self.frames += 1;
    }

    fn end_drawing(&mut self) {}

    fn begin_scissor(&mut self, r: Rect) {
        self.scissors.push(r);
    }

    fn end_scissor(&mut self) {
        self.scissor_ends += 1;
    }

    fn clear(&mut self, _color: Color) {
        self.clears += 1;
    }

    fn fill_rect(&mut self, _r: Rect, _color: Color) {
        self.rects += 1;
    }

    fn fill_rounded_rect(&mut self, _r: Rect, _roundness: f32, _color: Color) {
        self.rounded_rects += 1;
    }

    fn draw_text(&mut self, _font: Font, _text: &str, _pos: Point, _size: f32, _color: Color) {
        self.texts += 1;
    }

    fn measure_text(&self, _font: Font, text: &str, size: f32) -> Vec2 {
        // A deterministic stand-in: half-square glyphs.
        Vec2::new(text.chars().count() as f32 * size * 0.5, size)
    }

    fn draw_texture(&mut self, _texture: Texture, _pos: Point, _tint: Color) {
        self.textures += 1;
    }

    fn load_texture(&mut self, _rgba: &[u8], width: i32, height: i32) -> Result<Texture> {
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        Ok(Texture { id, width, height })
    }

    fn load_font(&mut self, _bytes: &[u8], size: i32) -> Result<Font> {
        Ok(Font {
            id: 1,
            base_size: size,
        })
    }

    fn is_touch_down(&self) -> bool {
        self.touch_down
    }

    fn touch_position(&self) -> Vec2 {
        self.touch_pos
    }

    fn touch_delta(&self) -> Vec2 {
        self.touch_delta
    }
}
