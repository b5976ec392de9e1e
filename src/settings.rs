//! Game settings
//!
//! Every field has a default from [`crate::consts`], so a settings file only
//! needs the values it changes.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{Aabb, Block, BlockCollision, World};

/// Errors while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the launch RNG
    pub seed: u64,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Block grid ===
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub block_size: Vec2,
    /// Offset between neighbouring blocks (column, row)
    pub block_pitch: Vec2,
    /// Top-left corner of the first block
    pub grid_origin: Vec2,

    // === Ball ===
    pub ball_start: Vec2,
    pub ball_size: Vec2,
    pub ball_speed: f32,

    // === Platform ===
    pub platform_start: Vec2,
    pub platform_size: Vec2,
    pub platform_speed: f32,
    /// Keep the platform inside the world horizontally
    pub confine_platform: bool,

    // === Rules ===
    pub block_collision: BlockCollision,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,

            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            grid_rows: GRID_ROWS,
            grid_cols: GRID_COLS,
            block_size: Vec2::new(BLOCK_WIDTH, BLOCK_HEIGHT),
            block_pitch: Vec2::new(BLOCK_PITCH_X, BLOCK_PITCH_Y),
            grid_origin: Vec2::new(GRID_ORIGIN_X, GRID_ORIGIN_Y),

            ball_start: Vec2::new(BALL_START_X, BALL_START_Y),
            ball_size: Vec2::splat(BALL_SIZE),
            ball_speed: BALL_SPEED,

            platform_start: Vec2::new(PLATFORM_START_X, PLATFORM_START_Y),
            platform_size: Vec2::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
            platform_speed: PLATFORM_SPEED,
            confine_platform: true,

            block_collision: BlockCollision::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject layouts the simulation cannot run
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(SettingsError::invalid("world", "width and height must be positive"));
        }
        if !(self.ball_speed >= 1.0) {
            return Err(SettingsError::invalid("ball_speed", "must be at least 1"));
        }
        if !(self.platform_speed > 0.0) {
            return Err(SettingsError::invalid("platform_speed", "must be positive"));
        }
        for (field, size) in [
            ("ball_size", self.ball_size),
            ("platform_size", self.platform_size),
            ("block_size", self.block_size),
        ] {
            if !(size.x > 0.0 && size.y > 0.0) {
                return Err(SettingsError::invalid(field, "width and height must be positive"));
            }
        }

        let world = World {
            width: self.world_width,
            height: self.world_height,
        }
        .bounds();
        let inside = |r: &Aabb| {
            r.left() >= world.left()
                && r.right() <= world.right()
                && r.top() >= world.top()
                && r.bottom() <= world.bottom()
        };

        let ball = Aabb {
            pos: self.ball_start,
            size: self.ball_size,
        };
        if !inside(&ball) {
            return Err(SettingsError::invalid("ball_start", "ball must start inside the world"));
        }
        let platform = Aabb {
            pos: self.platform_start,
            size: self.platform_size,
        };
        if !inside(&platform) {
            return Err(SettingsError::invalid(
                "platform_start",
                "platform must start inside the world",
            ));
        }

        let count = self.grid_rows.checked_mul(self.grid_cols);
        if !count.is_some_and(|n| n <= MAX_BLOCKS) {
            return Err(SettingsError::invalid(
                "grid",
                format!("at most {MAX_BLOCKS} blocks allowed"),
            ));
        }
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Ok(());
        }
        // Block positions are linear in (col, row), so the corner blocks bound the grid
        let (last_col, last_row) = (self.grid_cols - 1, self.grid_rows - 1);
        for (col, row) in [(0, 0), (last_col, 0), (0, last_row), (last_col, last_row)] {
            let block = self.block_at(col, row);
            if !inside(&block.rect) {
                return Err(SettingsError::invalid(
                    "grid",
                    format!("block at ({}, {}) lies outside the world", block.rect.pos.x, block.rect.pos.y),
                ));
            }
        }

        Ok(())
    }

    /// Row-major block grid, every block active
    pub fn build_grid(&self) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(self.grid_rows as usize * self.grid_cols as usize);
        for row in 0..self.grid_rows {
            for col in 0..self.grid_cols {
                blocks.push(self.block_at(col, row));
            }
        }
        blocks
    }

    fn block_at(&self, col: u32, row: u32) -> Block {
        let pos = self.grid_origin + self.block_pitch * Vec2::new(col as f32, row as f32);
        Block::new(pos.x, pos.y, self.block_size.x, self.block_size.y)
    }
}
