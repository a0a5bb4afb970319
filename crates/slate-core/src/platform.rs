use geom::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;
use crate::error::Result;

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Construct an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Construct a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
}

/// An opaque handle to a texture owned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Texture {
    /// Platform-assigned identifier; zero means "no texture".
    pub id: u32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// An opaque handle to a font owned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Font {
    /// Platform-assigned identifier; zero means the platform's built-in font.
    pub id: u32,
    /// The size the glyph atlas was rasterized at.
    pub base_size: i32,
}

/// The injected boundary between the toolkit and the concrete display/input
/// device. The core depends only on this trait; a scripted test double (see
/// [`crate::tutils::TestPlatform`]) replaces the real display entirely.
///
/// Implementations are driven from the frame thread only. `init` is called
/// once before the first frame and `close_window` once after the last one;
/// the drawing calls arrive strictly between `begin_drawing` and
/// `end_drawing` brackets.
pub trait Platform {
    /// Create the window/surface for the given display configuration.
    fn init(&mut self, cfg: &DisplayConfig);
    /// Tear the window down.
    fn close_window(&mut self);
    /// Whether the platform requested the loop to stop (window close).
    fn window_should_close(&self) -> bool;

    /// Start a frame.
    fn begin_drawing(&mut self);
    /// Finish a frame and present it. Implementations typically also pace
    /// the loop to the configured frame rate here.
    fn end_drawing(&mut self);

    /// Restrict subsequent draw calls to `r`, in physical coordinates.
    fn begin_scissor(&mut self, r: Rect);
    /// Remove the scissor restriction.
    fn end_scissor(&mut self);

    /// Fill the whole surface with a color.
    fn clear(&mut self, color: Color);
    /// Fill a rectangle, in physical coordinates.
    fn fill_rect(&mut self, r: Rect, color: Color);
    /// Fill a rounded rectangle; `roundness` is 0.0 for square corners and
    /// 1.0 for a capsule.
    fn fill_rounded_rect(&mut self, r: Rect, roundness: f32, color: Color);
    /// Draw a text run at a physical position.
    fn draw_text(&mut self, font: Font, text: &str, pos: Point, size: f32, color: Color);
    /// Measure a text run without drawing it.
    fn measure_text(&self, font: Font, text: &str, size: f32) -> Vec2;
    /// Draw a texture with its top-left corner at a physical position.
    fn draw_texture(&mut self, texture: Texture, pos: Point, tint: Color);

    /// Upload an RGBA8 image and return a handle to it.
    fn load_texture(&mut self, rgba: &[u8], width: i32, height: i32) -> Result<Texture>;
    /// Load a font from its raw file contents at a given rasterization size.
    fn load_font(&mut self, bytes: &[u8], size: i32) -> Result<Font>;

    /// Whether the pointer is currently down.
    fn is_touch_down(&self) -> bool;
    /// The pointer position, in physical display coordinates.
    fn touch_position(&self) -> Vec2;
    /// The pointer movement since the previous frame.
    fn touch_delta(&self) -> Vec2;
}
