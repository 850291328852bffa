//! Surface that records draw calls instead of painting
//!
//! Used by the native demo and by tests to inspect what a frame drew.

use glam::Vec2;

use super::{Color, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    FillRect { pos: Vec2, size: Vec2, color: Color },
    StrokeRect { pos: Vec2, size: Vec2, color: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, color: Color },
    Triangle { points: [Vec2; 3], color: Color },
    Line { from: Vec2, to: Vec2, color: Color, dashed: bool },
    Text { text: String, center: Vec2, color: Color },
    Alpha(f32),
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// Change reported dimensions, as if the canvas were resized
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Forget calls from previous frames
    pub fn reset(&mut self) {
        self.calls.clear();
    }

    /// All text drawn, in call order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.calls.push(DrawCall::FillRect { pos, size, color });
    }

    fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: Color, _line_width: f32) {
        self.calls.push(DrawCall::StrokeRect { pos, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, _line_width: f32) {
        self.calls.push(DrawCall::StrokeCircle { center, radius, color });
    }

    fn fill_triangle(&mut self, points: [Vec2; 3], color: Color) {
        self.calls.push(DrawCall::Triangle { points, color });
    }

    fn line(
        &mut self,
        from: Vec2,
        to: Vec2,
        color: Color,
        _line_width: f32,
        dash: Option<(f32, f32)>,
    ) {
        self.calls.push(DrawCall::Line {
            from,
            to,
            color,
            dashed: dash.is_some(),
        });
    }

    fn text(&mut self, text: &str, center: Vec2, _size_px: f32, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            center,
            color,
        });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.calls.push(DrawCall::Alpha(alpha));
    }
}
