//! Render collaborator seam
//!
//! The player never owns a graphics context. Hosts implement `FrameRenderer`
//! for whatever draws textures (GL, wgpu, egui, a test recorder) and the
//! player hands it the current frame plus a target rectangle.

use crate::entities::frame::Frame;

/// Target rectangle in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Draws a frame handle into a rectangle
pub trait FrameRenderer {
    fn draw(&mut self, frame: &Frame, rect: Rect);
}
