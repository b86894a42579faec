use clap::Parser;
use std::path::PathBuf;

use crate::core::player::LoopMode;

/// Headless image sequence player: loads a sequence and simulates playback ticks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// First frame of the sequence, or a directory containing it
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Playback settings file (JSON); falls back to SEQPLAY_CONFIG
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Frames per second (overrides config)
    #[arg(long = "fps", value_name = "FPS")]
    pub fps: Option<f32>,

    /// Playback speed multiplier (overrides config)
    #[arg(short = 's', long = "speed", value_name = "X")]
    pub speed: Option<f32>,

    /// Loop mode (overrides config)
    #[arg(short = 'o', long = "loop", value_enum, value_name = "MODE")]
    pub loop_mode: Option<LoopMode>,

    /// Number of host ticks to simulate
    #[arg(short = 'n', long = "ticks", value_name = "N", default_value_t = 120)]
    pub ticks: u32,

    /// Host tick rate in Hz
    #[arg(long = "tick-rate", value_name = "HZ", default_value_t = 60.0)]
    pub tick_rate: f32,

    /// Print the effective settings as JSON and exit
    #[arg(long = "print-config")]
    pub print_config: bool,

    /// Enable debug logging to file (default: seqplay.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Args::parse_from([
            "seqplay", "shots/a_001.png", "--loop", "palindrome", "--fps", "24", "-vv",
        ]);
        assert_eq!(args.path, PathBuf::from("shots/a_001.png"));
        assert_eq!(args.loop_mode, Some(LoopMode::Palindrome));
        assert_eq!(args.fps, Some(24.0));
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.ticks, 120);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_log_flag_without_value() {
        let args = Args::parse_from(["seqplay", "dir", "--log"]);
        assert_eq!(args.log_file, Some(None));
    }
}
