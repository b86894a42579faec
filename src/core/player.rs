//! Playback engine: maps accumulated time to a frame index
//!
//! **Why**: A folder of numbered stills should behave like a clip. The host
//! calls `update(dt)` once per tick; the player accumulates time, applies the
//! loop policy and exposes the frame for that moment.
//!
//! **Used by**: Host tick loops, the `seqplay` harness
//!
//! # Timing Model
//!
//! `duration = total_frames / fps`. Each tick adds `dt * speed` to `elapsed`,
//! `elapsed / duration` is the normalized position, and the frame index is
//! `floor(position * last_index)`. Nothing runs between ticks.
//!
//! # Loop Modes
//!
//! - **None**: position clamps at 1.0; crossing it stops playback on the last frame
//! - **Normal**: position wraps from 1.0 back to 0.0
//! - **Palindrome**: every time the phase crosses 1.0 the direction flips;
//!   while moving backwards the displayed position is `1 - phase`
//!
//! # Frame-new and Pixels
//!
//! `is_frame_new()` is an edge signal: set when the index actually changes,
//! cleared at the start of every `update()`. Pixel readback is lazy: an index
//! change only marks the cached pixels stale, `pixels()` refreshes them.
//!
//! # Unloaded State
//!
//! With no frames every playback and navigation call is a silent no-op.

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::render::{FrameRenderer, Rect};
use crate::config::PlayerConfig;
use crate::entities::frame::{Frame, Pixels};
use crate::entities::loader::{FrameDecoder, ImageDecoder, Loader};
use crate::utils::sequences::{self, SequenceError};

/// What happens when playback reaches the end of the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Hold the last frame and stop
    #[default]
    None,
    /// Jump back to the first frame
    Normal,
    /// Bounce between first and last frame
    Palindrome,
}

/// Sequence loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error("no frames to load")]
    Empty,
    #[error("none of the {attempted} frames could be decoded")]
    NothingDecoded { attempted: usize },
}

/// Image sequence player
///
/// Owns every decoded frame from `load*` until `close()`, the next load, or drop.
/// Frame rate, speed and loop mode survive `close()`.
pub struct Player {
    frames: Vec<Frame>,
    sources: Vec<PathBuf>,
    decoder: Box<dyn FrameDecoder>,

    // Lazy readback of the current frame
    pixels: Pixels,
    pixels_stale: bool,

    current: usize,
    elapsed: f32,
    duration: f32,
    fps: f32,
    speed: f32,
    loop_mode: LoopMode,

    playing: bool,
    paused: bool,
    playing_backwards: bool, // Palindrome only
    frame_new: bool,
}

impl Player {
    /// Create an empty player with default settings
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    /// Create an empty player with the given settings
    pub fn with_config(config: PlayerConfig) -> Self {
        let mut player = Self {
            frames: Vec::new(),
            sources: Vec::new(),
            decoder: Box::new(ImageDecoder),
            pixels: Pixels::default(),
            pixels_stale: false,
            current: 0,
            elapsed: 0.0,
            duration: 0.0,
            fps: PlayerConfig::default().fps,
            speed: 1.0,
            loop_mode: LoopMode::None,
            playing: false,
            paused: false,
            playing_backwards: false,
            frame_new: false,
        };
        player.apply_config(&config);
        player
    }

    /// Replace the decode backend used by `load` / `load_paths`
    pub fn with_decoder(mut self, decoder: Box<dyn FrameDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Apply frame rate, speed and loop mode (invalid values are rejected individually)
    pub fn apply_config(&mut self, config: &PlayerConfig) {
        self.set_frame_rate(config.fps);
        self.set_speed(config.speed);
        self.set_loop_mode(config.loop_mode);
    }

    /// Current settings as a config
    pub fn config(&self) -> PlayerConfig {
        PlayerConfig {
            fps: self.fps,
            speed: self.speed,
            loop_mode: self.loop_mode,
        }
    }

    // === Loading ===

    /// Resolve a file or directory into a sequence and decode it.
    ///
    /// Blocks until every frame is decoded. Returns the frame count.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        self.close();
        let paths = sequences::resolve(path.as_ref())?;
        self.load_paths(&paths)
    }

    /// Decode an explicit, already ordered list of files.
    ///
    /// Files that fail to decode keep their slot as placeholders; the load only
    /// fails when none decode.
    pub fn load_paths(&mut self, paths: &[PathBuf]) -> Result<usize, LoadError> {
        self.close();
        if paths.is_empty() {
            return Err(LoadError::Empty);
        }

        let decoded = Loader::decode_all(self.decoder.as_ref(), paths);
        if decoded.loaded() == 0 {
            return Err(LoadError::NothingDecoded {
                attempted: paths.len(),
            });
        }
        if decoded.failed > 0 {
            warn!(
                "{} of {} frames failed to decode and show placeholders",
                decoded.failed,
                paths.len()
            );
        }

        self.sources = paths.to_vec();
        Ok(self.install(decoded.frames))
    }

    /// Take ownership of frames decoded by the host.
    ///
    /// `sources()` stays empty for sequences loaded this way.
    pub fn load_frames(&mut self, frames: Vec<Frame>) -> Result<usize, LoadError> {
        self.close();
        if frames.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(self.install(frames))
    }

    fn install(&mut self, frames: Vec<Frame>) -> usize {
        self.frames = frames;
        self.current = 0;
        self.elapsed = 0.0;
        self.playing_backwards = false;
        self.frame_new = true;
        self.pixels_stale = true;
        self.update_duration();

        info!(
            "Loaded {} frames ({}x{}), {:.3}s at {} fps",
            self.frames.len(),
            self.width(),
            self.height(),
            self.duration,
            self.fps
        );
        self.frames.len()
    }

    /// Release all frames and return to the unloaded state
    pub fn close(&mut self) {
        if !self.frames.is_empty() {
            debug!("Closing sequence ({} frames)", self.frames.len());
        }
        self.frames.clear();
        self.sources.clear();
        self.pixels = Pixels::default();
        self.pixels_stale = false;
        self.current = 0;
        self.elapsed = 0.0;
        self.duration = 0.0;
        self.playing = false;
        self.paused = false;
        self.playing_backwards = false;
        self.frame_new = false;
    }

    // === Settings ===

    /// Set frames per second; recomputes duration and keeps the playhead in place
    pub fn set_frame_rate(&mut self, fps: f32) {
        if !(fps.is_finite() && fps > 0.0) {
            warn!("Ignoring invalid frame rate {}", fps);
            return;
        }
        let phase = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            0.0
        };
        self.fps = fps;
        self.update_duration();
        self.elapsed = phase * self.duration;
        debug!("Frame rate set to {} fps, duration {:.3}s", fps, self.duration);
    }

    /// Set playback speed multiplier (1.0 = real time, 0.0 = frozen)
    pub fn set_speed(&mut self, speed: f32) {
        if !(speed.is_finite() && speed >= 0.0) {
            warn!("Ignoring invalid playback speed {}", speed);
            return;
        }
        self.speed = speed;
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
        if mode != LoopMode::Palindrome && self.playing_backwards {
            self.playing_backwards = false;
            self.sync_time();
        }
        debug!("Loop mode set to {:?}", mode);
    }

    fn update_duration(&mut self) {
        self.duration = self.frames.len() as f32 / self.fps;
    }

    // === Transport ===

    /// Start playback, rewinding first if the sequence already ran to its end
    pub fn play(&mut self) {
        if !self.is_loaded() {
            return;
        }
        if self.is_movie_done() {
            self.rewind();
        }
        self.playing = true;
        self.paused = false;
        debug!("Playback started at frame {}", self.current);
    }

    /// Stop playback and return to the first frame
    pub fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.rewind();
        debug!("Playback stopped");
    }

    /// Pause or resume without touching the playing flag or the clock
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn rewind(&mut self) {
        self.elapsed = 0.0;
        self.playing_backwards = false;
        self.seek(0);
    }

    /// Advance playback by `dt` seconds of host time
    pub fn update(&mut self, dt: f32) {
        self.frame_new = false;

        if !self.is_loaded() || !self.playing || self.paused {
            return;
        }

        let duration = self.duration;
        self.elapsed = (self.elapsed + dt * self.speed).max(0.0);
        let mut position = self.elapsed / duration;

        match self.loop_mode {
            LoopMode::None => {
                if position > 1.0 {
                    position = 1.0;
                    self.elapsed = duration;
                    self.playing = false;
                    debug!("Reached end of sequence, stopping");
                }
            }
            LoopMode::Normal => {
                if position >= 1.0 {
                    let wraps = position.floor();
                    self.elapsed = (self.elapsed - wraps * duration).max(0.0);
                    position = (position - wraps).clamp(0.0, 1.0);
                    trace!("Loop wrap ({} cycles)", wraps);
                }
            }
            LoopMode::Palindrome => {
                let mut phase = position;
                if phase >= 1.0 {
                    let bounces = phase.floor();
                    self.elapsed = (self.elapsed - bounces * duration).max(0.0);
                    phase = (phase - bounces).clamp(0.0, 1.0);
                    if bounces as u64 % 2 == 1 {
                        self.playing_backwards = !self.playing_backwards;
                        trace!("Palindrome bounce, backwards={}", self.playing_backwards);
                    }
                }
                position = if self.playing_backwards {
                    1.0 - phase
                } else {
                    phase
                };
            }
        }

        self.seek(self.index_at(position));
    }

    // === Navigation ===

    /// Jump to a frame; out-of-range values clamp to the sequence
    pub fn set_frame(&mut self, index: isize) {
        if self.seek(index) {
            self.sync_time();
        }
    }

    /// Jump to a normalized position (0.0 = first frame, 1.0 = last frame)
    pub fn set_position(&mut self, position: f32) {
        if !self.is_loaded() {
            return;
        }
        self.set_frame(self.index_at(position));
    }

    pub fn first_frame(&mut self) {
        self.set_frame(0);
    }

    /// Step one frame forward, honoring the loop mode.
    ///
    /// In palindrome mode the travel direction decides the step: while moving
    /// backwards this steps towards frame 0.
    pub fn next_frame(&mut self) {
        if !self.is_loaded() {
            return;
        }
        let last = self.last_index() as isize;
        let current = self.current as isize;

        let mut index = current + 1;
        if index > last {
            match self.loop_mode {
                LoopMode::None => {
                    index = last;
                    if self.playing {
                        self.stop();
                    }
                }
                LoopMode::Normal => index = 0,
                LoopMode::Palindrome => {}
            }
        }
        if self.loop_mode == LoopMode::Palindrome {
            if self.playing_backwards {
                index = current - 1;
                if index < 0 {
                    index = 0;
                    self.playing_backwards = false;
                }
            } else if index > last {
                index = last;
                self.playing_backwards = true;
            }
        }

        self.seek(index);
        self.sync_time();
    }

    /// Step one frame back; mirror image of `next_frame`
    pub fn previous_frame(&mut self) {
        if !self.is_loaded() {
            return;
        }
        let last = self.last_index() as isize;
        let current = self.current as isize;

        let mut index = current - 1;
        if index < 0 {
            match self.loop_mode {
                LoopMode::None => index = 0,
                LoopMode::Normal => index = last,
                LoopMode::Palindrome => {}
            }
        }
        if self.loop_mode == LoopMode::Palindrome {
            if self.playing_backwards {
                index = current + 1;
                if index > last {
                    index = last;
                    self.playing_backwards = false;
                }
            } else if index < 0 {
                index = 0;
                self.playing_backwards = true;
            }
        }

        self.seek(index);
        self.sync_time();
    }

    /// Clamp and move the playhead. Returns true if the index changed.
    fn seek(&mut self, index: isize) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let index = index.clamp(0, self.last_index() as isize) as usize;
        if index == self.current {
            return false;
        }
        trace!("Frame {} -> {}", self.current, index);
        self.current = index;
        self.frame_new = true;
        self.pixels_stale = true;
        true
    }

    /// Put the clock in the middle of the current frame's slot so the next
    /// `update` continues from a manual seek instead of snapping back.
    fn sync_time(&mut self) {
        let last = self.last_index();
        let position = if last == 0 {
            0.0
        } else {
            ((self.current as f32 + 0.5) / last as f32).min(1.0)
        };
        let phase = if self.playing_backwards {
            1.0 - position
        } else {
            position
        };
        self.elapsed = phase * self.duration;
    }

    fn index_at(&self, position: f32) -> isize {
        (position * self.last_index() as f32).floor() as isize
    }

    // === State ===

    pub fn is_loaded(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True only if the last `update` or navigation call changed the frame
    pub fn is_frame_new(&self) -> bool {
        self.frame_new
    }

    /// Not playing and parked on the last frame
    pub fn is_movie_done(&self) -> bool {
        !self.playing && self.current == self.last_index()
    }

    /// Palindrome travel direction; always false for other loop modes
    pub fn is_playing_backwards(&self) -> bool {
        self.playing_backwards
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn last_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Normalized position of the current frame (0.0 for single-frame sequences)
    pub fn position(&self) -> f32 {
        let last = self.last_index();
        if last == 0 {
            0.0
        } else {
            self.current as f32 / last as f32
        }
    }

    /// Seconds of playback accumulated in the current loop cycle
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Sequence length in seconds at the current frame rate
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn frame_rate(&self) -> f32 {
        self.fps
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Source files of the loaded sequence, in playback order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    // === Frame access ===

    /// Current frame handle
    pub fn frame(&self) -> Option<&Frame> {
        self.frames.get(self.current)
    }

    /// Width of the current frame, 0 when unloaded
    pub fn width(&self) -> u32 {
        self.frame().map_or(0, Frame::width)
    }

    /// Height of the current frame, 0 when unloaded
    pub fn height(&self) -> u32 {
        self.frame().map_or(0, Frame::height)
    }

    /// Whether `pixels()` would read back from the frame
    pub fn pixels_stale(&self) -> bool {
        self.pixels_stale
    }

    /// Pixels of the current frame.
    ///
    /// Read back only when the frame changed since the last call; otherwise the
    /// cached copy is returned.
    pub fn pixels(&mut self) -> Option<&Pixels> {
        let frame = self.frames.get(self.current)?;
        if self.pixels_stale {
            self.pixels = frame.read_pixels();
            self.pixels_stale = false;
        }
        Some(&self.pixels)
    }

    /// Draw the current frame into the given rectangle
    pub fn draw<R: FrameRenderer + ?Sized>(&self, renderer: &mut R, x: f32, y: f32, w: f32, h: f32) {
        if let Some(frame) = self.frame() {
            renderer.draw(frame, Rect::new(x, y, w, h));
        }
    }

    /// Draw the current frame at its natural size
    pub fn draw_at<R: FrameRenderer + ?Sized>(&self, renderer: &mut R, x: f32, y: f32) {
        self.draw(renderer, x, y, self.width() as f32, self.height() as f32);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("total_frames", &self.frames.len())
            .field("current", &self.current)
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("fps", &self.fps)
            .field("speed", &self.speed)
            .field("loop_mode", &self.loop_mode)
            .field("playing", &self.playing)
            .field("paused", &self.paused)
            .field("playing_backwards", &self.playing_backwards)
            .finish_non_exhaustive()
    }
}
