//! Image sequence discovery
//!
//! **Why**: Callers point at one frame (or at a folder) and expect the whole
//! numbered run to play: `shot_001.png`, `shot_002.png`, ...
//!
//! **Used by**: `Player::load`
//!
//! # Resolution Algorithm
//!
//! 1. File input: parent dir is the search root, file extension is the filter.
//!    Dir input: first allowed file (sorted by name) is the representative.
//! 2. Split the representative stem into prefix + trailing digits ("0001"),
//!    keeping the digit width as padding.
//! 3. List `<dir>/*.<ext>` and walk forward from the start number while
//!    `<prefix><number>` exists, re-padding after each increment.
//! 4. Stop at the first missing number. The result is contiguous by construction.
//!
//! A stem with no trailing digits resolves to just that one file.

use glob::{MatchOptions, Pattern};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::media::is_allowed_ext;

/// Lazy prefix, maximal run of trailing ASCII digits
static PREFIX_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(.*?)([0-9]*)$").expect("static regex"));

/// Sequence discovery errors
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported extension {ext:?} for {}", .path.display())]
    UnsupportedExtension { path: PathBuf, ext: String },
    #[error("no jpg/jpeg/png files in {}", .0.display())]
    NoImages(PathBuf),
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no frames found for {}", .0.display())]
    Empty(PathBuf),
}

/// Frame name split into prefix and zero-padded number
///
/// Example: "frame0009" -> prefix "frame", number "0009"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceName {
    prefix: String,
    number: String,
}

impl SequenceName {
    /// Split a file stem (no extension) at its trailing digits
    pub fn parse(stem: &str) -> Self {
        let (prefix, number) = split_prefix_number(stem);
        Self {
            prefix: prefix.to_string(),
            number: number.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Digits as written in the file name, padding included
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Digit width of the number ("0009" -> 4)
    pub fn padding(&self) -> usize {
        self.number.len()
    }

    /// Stem this name stands for
    pub fn stem(&self) -> String {
        format!("{}{}", self.prefix, self.number)
    }

    /// Name of the following frame, padded to the same width.
    ///
    /// None when there is no number to increment (or it overflows u64).
    pub fn next(&self) -> Option<Self> {
        if self.number.is_empty() {
            return None;
        }
        let value = self.number.parse::<u64>().ok()?.checked_add(1)?;
        Some(Self {
            prefix: self.prefix.clone(),
            number: format!("{:0width$}", value, width = self.padding()),
        })
    }
}

/// Split a stem into (prefix, trailing digits)
///
/// "shot_010" -> ("shot_", "010"), "still" -> ("still", "")
pub fn split_prefix_number(stem: &str) -> (&str, &str) {
    match PREFIX_NUMBER.captures(stem) {
        Some(caps) => {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let number = caps.get(2).map_or("", |m| m.as_str());
            (prefix, number)
        }
        None => (stem, ""),
    }
}

/// Resolve a file or directory into the ordered list of frame paths
pub fn resolve(path: &Path) -> Result<Vec<PathBuf>, SequenceError> {
    let (dir, representative) = if path.is_dir() {
        (path.to_path_buf(), first_image_in_dir(path)?)
    } else if path.is_file() {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        (dir, path.to_path_buf())
    } else {
        return Err(SequenceError::NotFound(path.to_path_buf()));
    };

    let ext = representative
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if !is_allowed_ext(&ext) {
        return Err(SequenceError::UnsupportedExtension {
            path: representative,
            ext,
        });
    }

    let stem = representative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let start = SequenceName::parse(stem);

    let files = list_with_ext(&dir, &ext)?;
    let frames = contiguous_run(&files, &start);
    if frames.is_empty() {
        return Err(SequenceError::Empty(path.to_path_buf()));
    }

    info!(
        "Resolved sequence: {}{}.{} ({} frames, padding={})",
        start.prefix(),
        "#".repeat(start.padding()),
        ext,
        frames.len(),
        start.padding()
    );
    Ok(frames)
}

/// First file (by name) in `dir` with an allowed extension
fn first_image_in_dir(dir: &Path) -> Result<PathBuf, SequenceError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SequenceError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    files
        .into_iter()
        .find(|p| super::media::is_image(p))
        .ok_or_else(|| SequenceError::NoImages(dir.to_path_buf()))
}

/// All files in `dir` with extension `ext`, sorted by name
pub fn list_with_ext(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, SequenceError> {
    let pattern = if dir.as_os_str().is_empty() {
        format!("*.{}", Pattern::escape(ext))
    } else {
        let dir = Pattern::escape(&dir.to_string_lossy());
        format!("{}/*.{}", dir.trim_end_matches('/'), Pattern::escape(ext))
    };

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    // glob yields paths in alphabetical order
    let files: Vec<PathBuf> = glob::glob_with(&pattern, options)?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    debug!("{} files match {}", files.len(), pattern);
    Ok(files)
}

/// Walk forward from `start` through `files`, stopping at the first gap
pub fn contiguous_run(files: &[PathBuf], start: &SequenceName) -> Vec<PathBuf> {
    let by_stem: BTreeMap<&str, &PathBuf> = files
        .iter()
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(|stem| (stem, p)))
        .collect();

    let mut frames = Vec::new();
    let mut name = start.clone();
    while let Some(path) = by_stem.get(name.stem().as_str()) {
        frames.push((*path).clone());
        match name.next() {
            Some(next) => name = next,
            None => break,
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn touch_all(names: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_split_prefix_number() {
        assert_eq!(split_prefix_number("frame0001"), ("frame", "0001"));
        assert_eq!(split_prefix_number("v2_shot_010"), ("v2_shot_", "010"));
        assert_eq!(split_prefix_number("still"), ("still", ""));
        assert_eq!(split_prefix_number("123"), ("", "123"));
        assert_eq!(split_prefix_number(""), ("", ""));
    }

    #[test]
    fn test_next_keeps_padding() {
        let name = SequenceName::parse("frame0009");
        let next = name.next().unwrap();
        assert_eq!(next.stem(), "frame0010");
        assert_eq!(next.padding(), 4);

        // Width grows only when the number outgrows it
        let name = SequenceName::parse("f_9");
        assert_eq!(name.next().unwrap().stem(), "f_10");

        assert!(SequenceName::parse("still").next().is_none());
    }

    /// Test: Gap stops the run
    /// Validates: shot_004 is not reached once shot_003 is missing
    #[test]
    fn test_resolve_stops_at_gap() {
        let dir = touch_all(&["shot_001.png", "shot_002.png", "shot_004.png"]);

        let frames = resolve(&dir.path().join("shot_001.png")).unwrap();
        assert_eq!(names(&frames), ["shot_001.png", "shot_002.png"]);
    }

    /// Test: Only the filter extension and exact stems count
    /// Validates: Other extensions and lookalike names are skipped
    #[test]
    fn test_resolve_filters_extension_and_prefix() {
        let dir = touch_all(&[
            "shot_001.png",
            "shot_002.png",
            "shot_003.jpg",
            "shot_003_v2.png",
            "take_003.png",
        ]);

        let frames = resolve(&dir.path().join("shot_002.png")).unwrap();
        assert_eq!(names(&frames), ["shot_002.png"]);
    }

    #[test]
    fn test_resolve_rolls_over_padding() {
        let dir = touch_all(&["f_0098.jpg", "f_0099.jpg", "f_0100.jpg", "f_0101.jpg"]);

        let frames = resolve(&dir.path().join("f_0098.jpg")).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(names(&frames)[3], "f_0101.jpg");
    }

    /// Test: Directory input
    /// Validates: First allowed file picks prefix and extension
    #[test]
    fn test_resolve_directory() {
        let dir = touch_all(&["a_notes.txt", "b_01.jpg", "b_02.jpg", "c_1.png", "c_2.png"]);

        let frames = resolve(dir.path()).unwrap();
        assert_eq!(names(&frames), ["b_01.jpg", "b_02.jpg"]);
    }

    /// Test: Name without trailing digits
    /// Validates: Resolves to a single, non-expanding sequence
    #[test]
    fn test_resolve_without_number() {
        let dir = touch_all(&["still.png", "still1.png"]);

        let frames = resolve(&dir.path().join("still.png")).unwrap();
        assert_eq!(names(&frames), ["still.png"]);
    }

    #[test]
    fn test_resolve_errors() {
        let dir = touch_all(&["notes.txt", "shot_001.PNG"]);

        assert!(matches!(
            resolve(&dir.path().join("missing_001.png")),
            Err(SequenceError::NotFound(_))
        ));
        assert!(matches!(
            resolve(&dir.path().join("shot_001.PNG")),
            Err(SequenceError::UnsupportedExtension { .. })
        ));
        assert!(matches!(resolve(dir.path()), Err(SequenceError::NoImages(_))));
    }

    #[test]
    fn test_contiguous_run_from_listing() {
        let files: Vec<PathBuf> = ["x/f1.png", "x/f2.png", "x/f3.png", "x/f5.png"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let run = contiguous_run(&files, &SequenceName::parse("f2"));
        assert_eq!(run, vec![PathBuf::from("x/f2.png"), PathBuf::from("x/f3.png")]);

        assert!(contiguous_run(&files, &SequenceName::parse("f9")).is_empty());
    }
}
