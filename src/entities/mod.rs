//! Entities module - decoded frames and the decode seam

pub mod frame;
pub mod loader;

pub use frame::{Frame, FrameError, FrameStatus, Pixels};
pub use loader::{FrameDecoder, ImageDecoder, Loader};
