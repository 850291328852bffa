//! Drawing surface abstraction
//!
//! The scene is drawn through the [`Surface`] trait so the same code paints a
//! browser canvas or records calls for inspection.

pub mod recording;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCall, RecordingSurface};
pub use scene::{SceneOptions, draw_frame};

use glam::Vec2;

/// RGBA color, components in 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` string for canvas styles
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }
}

/// Scene palette
pub mod palette {
    use super::Color;

    pub const ROAD: Color = Color::rgb(0x4a, 0x4a, 0x4a);
    pub const LANE_LINE: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const ROAD_EDGE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const PLAYER: Color = Color::rgb(0x4c, 0xaf, 0x50);
    pub const PLAYER_HURT: Color = Color::rgb(0xf4, 0x43, 0x36);
    pub const ARROW: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const OBSTACLE: Color = Color::rgb(0xf4, 0x43, 0x36);
    pub const OBSTACLE_BORDER: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const COLLECTIBLE: Color = Color::rgb(0xff, 0xd7, 0x00);
    pub const COLLECTIBLE_BORDER: Color = Color::rgb(0xff, 0xa5, 0x00);
    pub const GLYPH: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const OVERLAY: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const OVERLAY_TEXT: Color = Color::rgb(0xff, 0xff, 0xff);
}

/// Immediate-mode 2D drawing target
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: Color, line_width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32);
    fn fill_triangle(&mut self, points: [Vec2; 3], color: Color);
    /// Straight segment; `dash` is `(on, off)` lengths for a dashed stroke
    fn line(
        &mut self,
        from: Vec2,
        to: Vec2,
        color: Color,
        line_width: f32,
        dash: Option<(f32, f32)>,
    );
    /// Bold text centred on `center`
    fn text(&mut self, text: &str, center: Vec2, size_px: f32, color: Color);
    /// Global opacity for subsequent calls
    fn set_alpha(&mut self, alpha: f32);
}
