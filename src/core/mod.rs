//! Core engine: playback state machine and render seam

pub mod player;
pub mod render;
