//! Host abstraction layer
//!
//! The pieces an embedding host needs around the simulation:
//! - Input: key events to commands, buffered until a tick boundary
//! - Scheduling: frame time to a whole number of ticks

pub mod input;
pub mod scheduler;

pub use input::{CommandQueue, Key, KeyEvent, command_for};
pub use scheduler::FixedStep;

use crate::sim::{GameEvent, GamePhase, GameState, tick};

/// Run the ticks one display frame owes the simulation
///
/// Queued commands are applied before each tick. Stops early once the game
/// is over, leaving any remaining commands queued.
pub fn run_frame(
    state: &mut GameState,
    queue: &mut CommandQueue,
    clock: &mut FixedStep,
    frame_dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for _ in 0..clock.advance(frame_dt) {
        if state.phase == GamePhase::GameOver {
            break;
        }
        events.extend(queue.drain_into(state));
        events.extend(tick(state));
    }

    events
}
