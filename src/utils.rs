//! Utility functions and constants
//!
//! **Why**: Centralized helpers used across multiple modules
//!
//! **Used by**: sequence resolver, player

pub mod sequences;

/// Media file type detection
pub mod media {
    use std::path::Path;

    /// Extensions a sequence may be made of. Matched case-sensitively.
    pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

    /// Check extension (without the dot) against the allow-list
    pub fn is_allowed_ext(ext: &str) -> bool {
        ALLOWED_EXTENSIONS.contains(&ext)
    }

    /// Check if file has an allowed image extension
    pub fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(is_allowed_ext)
            .unwrap_or(false)
    }

}
