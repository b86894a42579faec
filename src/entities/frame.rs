//! Decoded frame handle with RGBA8 pixel storage
//!
//! **Why**: A sequence is fully resident after load, so every frame owns its
//! decoded pixels. The player hands out `&Frame` for drawing and only copies
//! pixels out (`read_pixels`) when a caller actually asks for them.
//!
//! **Used by**: Loader (decode target), Player (owned frame list), renderers
//!
//! # Pixel Format
//!
//! Always 8-bit RGBA, 4 bytes/pixel. JPEG/PNG sources are expanded on decode;
//! no other pixel format or colour-space conversion is offered.
//!
//! # Placeholders
//!
//! A frame that failed to decode keeps its slot in the sequence as a dark green
//! placeholder with `FrameStatus::Error`, so frame N still maps to file N.

use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Placeholder colour for frames that failed to decode (dark green RGBA)
const PLACEHOLDER_RGBA: [u8; 4] = [0, 100, 0, 255];

/// Frame loading status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Loaded, // Pixels decoded from source
    Error,  // Decode failed, buffer is a placeholder
}

/// Frame loading errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

/// Raw RGBA8 pixels read back from a frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pixels {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixels {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved RGBA bytes, row-major, top row first
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA value at (x, y), or None when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Single decoded image belonging to a sequence
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    file: Option<PathBuf>, // Immutable after creation
    status: FrameStatus,
}

impl Frame {
    /// Wrap an already decoded image
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            file: None,
            status: FrameStatus::Loaded,
        }
    }

    /// Build a frame from raw interleaved RGBA8 bytes
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        let image = RgbaImage::from_raw(width, height, data)
            .ok_or(FrameError::BufferSize { expected, actual })?;
        Ok(Self::from_image(image))
    }

    /// Placeholder standing in for a file that could not be decoded
    pub fn placeholder(width: u32, height: u32, file: PathBuf) -> Self {
        let image = RgbaImage::from_pixel(width, height, image::Rgba(PLACEHOLDER_RGBA));
        Self {
            image,
            file: Some(file),
            status: FrameStatus::Error,
        }
    }

    /// Attach the source path this frame was decoded from
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Source file, if the frame came from disk
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn status(&self) -> FrameStatus {
        self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == FrameStatus::Loaded
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Get resolution as tuple
    pub fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the decoded image (texture upload path)
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Memory size in bytes
    pub fn mem(&self) -> usize {
        self.image.as_raw().len()
    }

    /// Copy pixels out of the frame.
    ///
    /// This is the readback step: it allocates and copies the whole buffer,
    /// so the player only calls it when pixels are requested after a frame change.
    pub fn read_pixels(&self) -> Pixels {
        Pixels {
            width: self.image.width(),
            height: self.image.height(),
            data: self.image.as_raw().clone(),
        }
    }
}
