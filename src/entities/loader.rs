//! Frame decoding with a pluggable backend
//!
//! `FrameDecoder` is the seam to the image decode collaborator. The default
//! `ImageDecoder` goes through the `image` crate (PNG, JPEG); hosts with their
//! own decode/upload path plug in a different implementation.
//!
//! `Loader::decode_all` decodes a whole sequence on the rayon pool. It blocks
//! until every frame is done and keeps results in source order.

use log::{debug, error};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use super::frame::{Frame, FrameError};

/// Decode collaborator: turns one file into a frame handle
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Frame, FrameError>;
}

/// Default decoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl FrameDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Frame, FrameError> {
        debug!("Loading image: {}", path.display());

        let img = image::open(path)?;
        Ok(Frame::from_image(img.to_rgba8()).with_file(path))
    }
}

/// Result of decoding a full sequence
#[derive(Debug, Default)]
pub struct Decoded {
    /// One frame per source path, placeholders where decoding failed
    pub frames: Vec<Frame>,
    /// Number of placeholder slots
    pub failed: usize,
}

impl Decoded {
    /// Frames that decoded successfully
    pub fn loaded(&self) -> usize {
        self.frames.len() - self.failed
    }
}

/// Sequence decode driver
pub struct Loader;

impl Loader {
    /// Decode every path in order.
    ///
    /// Failed files are logged and replaced by a placeholder sized like the first
    /// good frame, so indices keep matching source files. If nothing decodes,
    /// `frames` comes back empty.
    pub fn decode_all(decoder: &dyn FrameDecoder, paths: &[PathBuf]) -> Decoded {
        let results: Vec<Result<Frame, FrameError>> =
            paths.par_iter().map(|path| decoder.decode(path)).collect();

        let Some((width, height)) = results
            .iter()
            .find_map(|r| r.as_ref().ok().map(Frame::resolution))
        else {
            for (path, result) in paths.iter().zip(&results) {
                if let Err(e) = result {
                    error!("Could not load {}: {}", path.display(), e);
                }
            }
            return Decoded::default();
        };

        let mut failed = 0;
        let frames = paths
            .iter()
            .zip(results)
            .map(|(path, result)| match result {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Could not load {}: {}", path.display(), e);
                    failed += 1;
                    Frame::placeholder(width, height, path.clone())
                }
            })
            .collect();

        Decoded { frames, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::frame::FrameStatus;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    /// Decoder that fails on any path containing "bad"
    struct Flaky;

    impl FrameDecoder for Flaky {
        fn decode(&self, path: &Path) -> Result<Frame, FrameError> {
            if path.to_string_lossy().contains("bad") {
                return Err(FrameError::UnsupportedFormat(path.display().to_string()));
            }
            Ok(Frame::from_rgba8(4, 2, vec![255u8; 4 * 2 * 4])?.with_file(path))
        }
    }

    /// Test: Decoding real PNG files
    /// Validates: image backend produces RGBA8 frames with source paths
    #[test]
    fn test_image_decoder_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img_01.png");
        RgbaImage::from_pixel(5, 3, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let frame = ImageDecoder.decode(&path).unwrap();
        assert_eq!(frame.resolution(), (5, 3));
        assert_eq!(frame.file(), Some(path.as_path()));
        assert_eq!(frame.read_pixels().pixel(4, 2), Some([1, 2, 3, 255]));
    }

    /// Test: Decoding garbage fails
    /// Validates: image errors surface as FrameError::Image
    #[test]
    fn test_image_decoder_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img_01.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(ImageDecoder.decode(&path), Err(FrameError::Image(_))));
    }

    /// Test: Partial failure keeps positions
    /// Validates: Failed slot becomes a placeholder sized like good frames
    #[test]
    fn test_decode_all_keeps_gaps() {
        let paths: Vec<PathBuf> = ["a_1.png", "bad_2.png", "a_3.png"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let decoded = Loader::decode_all(&Flaky, &paths);
        assert_eq!(decoded.frames.len(), 3);
        assert_eq!(decoded.failed, 1);
        assert_eq!(decoded.loaded(), 2);
        assert_eq!(decoded.frames[1].status(), FrameStatus::Error);
        assert_eq!(decoded.frames[1].resolution(), (4, 2));
        assert_eq!(decoded.frames[2].file(), Some(Path::new("a_3.png")));
    }

    /// Test: Every file fails
    /// Validates: No frames are returned
    #[test]
    fn test_decode_all_nothing_loaded() {
        let paths = vec![PathBuf::from("bad_1.png"), PathBuf::from("bad_2.png")];

        let decoded = Loader::decode_all(&Flaky, &paths);
        assert!(decoded.frames.is_empty());
        assert_eq!(decoded.loaded(), 0);
    }
}
