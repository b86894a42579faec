//! seqplay - headless playback harness
//!
//! Loads a sequence, plays it for a fixed number of simulated host ticks and
//! logs every frame change. Useful for checking timing and loop settings
//! against real files without a window.

use anyhow::{Context, Result, ensure};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use seqplay::cli::Args;
use seqplay::{Frame, FrameRenderer, Player, PlayerConfig, Rect};

/// Renderer that logs what would be drawn
#[derive(Default)]
struct LogRenderer {
    draws: u32,
    last_file: Option<PathBuf>,
}

impl FrameRenderer for LogRenderer {
    fn draw(&mut self, frame: &Frame, rect: Rect) {
        self.draws += 1;
        self.last_file = frame.file().map(PathBuf::from);
        info!(
            "draw {} ({}x{}, {:?}) at {:.0},{:.0} {:.0}x{:.0}",
            frame.file().map(|p| p.display().to_string()).unwrap_or_default(),
            frame.width(),
            frame.height(),
            frame.status(),
            rect.x,
            rect.y,
            rect.w,
            rect.h
        );
    }
}

fn init_logging(args: &Args) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| PathBuf::from("seqplay.log"));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level.max(log::LevelFilter::Debug))
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {}", log_path.display());
    } else {
        // Respects RUST_LOG if set
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(log_level.as_str().to_lowercase()),
        )
        .format_timestamp_millis()
        .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    debug!("Command-line args: {:?}", args);

    let mut config = PlayerConfig::from_env_and_cli(args.config.clone())?;
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if let Some(mode) = args.loop_mode {
        config.loop_mode = mode;
    }

    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    ensure!(
        args.tick_rate.is_finite() && args.tick_rate > 0.0,
        "Tick rate must be positive, got {}",
        args.tick_rate
    );
    let dt = 1.0 / args.tick_rate;

    let mut player = Player::with_config(config);
    let count = player
        .load(&args.path)
        .with_context(|| format!("Failed to load sequence: {}", args.path.display()))?;

    let mut renderer = LogRenderer::default();
    player.play();
    player.draw_at(&mut renderer, 0.0, 0.0);

    let mut ticks_run = 0;
    for tick in 0..args.ticks {
        player.update(dt);
        ticks_run = tick + 1;
        if player.is_frame_new() {
            player.draw_at(&mut renderer, 0.0, 0.0);
        }
        if !player.is_playing() {
            debug!("Playback finished at tick {}", tick);
            break;
        }
    }

    let config = player.config();
    println!("frames:        {}", count);
    println!("resolution:    {}x{}", player.width(), player.height());
    println!(
        "timing:        {} fps x{} ({:.3}s), loop {:?}",
        config.fps,
        config.speed,
        player.duration(),
        config.loop_mode
    );
    println!("ticks:         {} at {} Hz", ticks_run, args.tick_rate);
    println!("frames drawn:  {}", renderer.draws);
    println!(
        "final frame:   {} / {}{}",
        player.current_frame(),
        player.last_index(),
        if player.is_movie_done() { " (done)" } else { "" }
    );
    if let Some(file) = &renderer.last_file {
        println!("last file:     {}", file.display());
    }

    Ok(())
}
