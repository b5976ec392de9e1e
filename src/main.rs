//! Brick Bounce headless runner
//!
//! Drives the simulation the way a display host would: a 60 Hz frame clock,
//! key events queued between ticks, a renderer fed after every frame.

use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, info};

use brick_bounce::consts::SIM_DT;
use brick_bounce::host::{CommandQueue, FixedStep, Key, KeyEvent, run_frame};
use brick_bounce::renderer::{DrawCmd, Renderer, Sprite, draw_list};
use brick_bounce::sim::{GameEvent, GamePhase, GameState};
use brick_bounce::{Settings, SettingsError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the launch RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of display frames to run
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// Steer the platform toward the ball instead of idling
    #[arg(long)]
    autopilot: bool,

    /// Print the final game state as JSON
    #[arg(long)]
    dump: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Counts what it is asked to draw
#[derive(Default)]
struct LogRenderer {
    frames: u64,
    last_blocks: usize,
}

impl Renderer for LogRenderer {
    fn present(&mut self, cmds: &[DrawCmd]) {
        self.frames += 1;
        let blocks = cmds.iter().filter(|c| c.sprite == Sprite::Block).count();
        if blocks != self.last_blocks {
            log::debug!("Frame {}: {} blocks on screen", self.frames, blocks);
            self.last_blocks = blocks;
        }
    }
}

/// Which key the autopilot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    None,
    Left,
    Right,
}

/// Fire once, then keep the platform centre under the ball centre
fn autopilot(state: &GameState, held: &mut Held, queue: &mut CommandQueue) {
    if state.phase == GamePhase::Idle {
        queue.push_key(KeyEvent::Down(Key::Space.code()));
        queue.push_key(KeyEvent::Up(Key::Space.code()));
        return;
    }

    let platform_center = state.platform.pos.x + state.platform.size.x / 2.0;
    let error = state.ball.center().x - platform_center;
    let dead_zone = state.platform.speed;
    let want = if error < -dead_zone {
        Held::Left
    } else if error > dead_zone {
        Held::Right
    } else {
        Held::None
    };

    if want == *held {
        return;
    }
    match want {
        Held::Left => queue.push_key(KeyEvent::Down(Key::Left.code())),
        Held::Right => queue.push_key(KeyEvent::Down(Key::Right.code())),
        Held::None => queue.push_key(KeyEvent::Up(Key::Left.code())),
    }
    *held = want;
}

fn load_settings(args: &Args) -> Result<Settings, SettingsError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    Ok(settings)
}

fn main() {
    let args = Args::parse();
    let log_level = args.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("Brick Bounce (headless) starting...");

    let settings = load_settings(&args).unwrap_or_else(|e| {
        log::error!("{e}; using default settings");
        Settings::default()
    });

    let mut state = match GameState::from_settings(&settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let mut queue = CommandQueue::new();
    let mut clock = FixedStep::default();
    let mut renderer = LogRenderer::default();
    let mut held = Held::None;

    info!(
        "Game initialized with seed {} ({} blocks)",
        state.seed,
        state.blocks.len()
    );

    for _ in 0..args.frames {
        if args.autopilot {
            autopilot(&state, &mut held, &mut queue);
        }

        for event in run_frame(&mut state, &mut queue, &mut clock, SIM_DT) {
            match event {
                GameEvent::BlockDestroyed { index } => log::debug!("Block {index} destroyed"),
                GameEvent::BoardCleared => info!("Board cleared at tick {}", state.time_ticks),
                _ => {}
            }
        }
        renderer.present(&draw_list(&state));

        if state.phase == GamePhase::GameOver || state.is_cleared() {
            break;
        }
    }

    info!(
        "Stopped after {} ticks: {:?}, {} of {} blocks left",
        state.time_ticks,
        state.phase,
        state.active_blocks().count(),
        state.blocks.len()
    );

    if args.dump {
        match serde_json::to_string_pretty(&state) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize state: {e}"),
        }
    }
}
