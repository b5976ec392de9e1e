//! Brick Bounce - a fixed-timestep breakout game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball, platform, blocks, tick ordering)
//! - `settings`: Data-driven game configuration
//! - `host`: Input mapping and frame scheduling for the embedding host
//! - `renderer`: Read-only draw list handed to whatever paints the frame

pub mod host;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};
pub use sim::{GameEvent, GamePhase, GameState, tick};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 640.0;
    pub const WORLD_HEIGHT: f32 = 360.0;

    /// Block grid layout
    pub const GRID_ROWS: u32 = 4;
    pub const GRID_COLS: u32 = 8;
    /// Largest grid a settings file may ask for
    pub const MAX_BLOCKS: u32 = 4096;
    pub const BLOCK_WIDTH: f32 = 60.0;
    pub const BLOCK_HEIGHT: f32 = 20.0;
    /// Distance between the left edges of neighbouring blocks
    pub const BLOCK_PITCH_X: f32 = 64.0;
    /// Distance between the top edges of neighbouring rows
    pub const BLOCK_PITCH_Y: f32 = 24.0;
    pub const GRID_ORIGIN_X: f32 = 65.0;
    pub const GRID_ORIGIN_Y: f32 = 35.0;

    /// Ball defaults - starts at rest on top of the platform
    pub const BALL_START_X: f32 = 320.0;
    pub const BALL_START_Y: f32 = 280.0;
    pub const BALL_SIZE: f32 = 20.0;
    /// Per-tick displacement magnitude
    pub const BALL_SPEED: f32 = 3.0;

    /// Platform defaults
    pub const PLATFORM_START_X: f32 = 280.0;
    pub const PLATFORM_START_Y: f32 = 300.0;
    pub const PLATFORM_WIDTH: f32 = 100.0;
    pub const PLATFORM_HEIGHT: f32 = 14.0;
    pub const PLATFORM_SPEED: f32 = 6.0;
}
