//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-tick displacements, no elapsed-time scaling
//! - Seeded RNG only
//! - Stable iteration order (blocks in row-major order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use state::{
    Ball, BallHold, Block, BlockCollision, Command, Direction, GameEvent, GamePhase, GameState,
    Platform, Wall, World,
};
pub use tick::tick;
