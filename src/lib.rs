//! SEQPLAY - Image sequence playback library
//!
//! Plays a numbered run of stills (`frame0001.png` ...) like a clip: resolve the
//! run on disk, decode every frame, then drive `Player::update(dt)` per tick.
//!
//! ```rust,no_run
//! use seqplay::{LoopMode, Player};
//!
//! let mut player = Player::new();
//! player.set_loop_mode(LoopMode::Palindrome);
//! player.load("renders/shot_0001.png")?;
//! player.play();
//! player.update(1.0 / 60.0);
//! if player.is_frame_new() {
//!     let _frame = player.frame();
//! }
//! # Ok::<(), seqplay::LoadError>(())
//! ```

// Core engine (player, render seam)
pub mod core;

pub mod cli;
pub mod config;
pub mod entities;
pub mod utils;

// Re-export commonly used types
pub use config::PlayerConfig;
pub use crate::core::player::{LoadError, LoopMode, Player};
pub use crate::core::render::{FrameRenderer, Rect};
pub use entities::{Frame, FrameDecoder, FrameError, FrameStatus, ImageDecoder, Pixels};
pub use utils::sequences::{SequenceError, resolve};
