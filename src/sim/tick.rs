//! Fixed timestep simulation tick
//!
//! Collisions are resolved against the lookahead boxes first, positions are
//! committed last, so every position change in a tick uses the velocity that
//! tick settled on.

use super::state::{BlockCollision, GameEvent, GamePhase, GameState, Wall};

/// Advance the game state by one tick
pub fn tick(state: &mut GameState) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.phase == GamePhase::GameOver {
        return events;
    }

    state.time_ticks += 1;

    collide_blocks(state, &mut events);
    collide_platform(state, &mut events);

    match state.ball.collide_world_bounds(&state.world) {
        Some(Wall::Bottom) => {
            state.phase = GamePhase::GameOver;
            log::info!("Game over at tick {}", state.time_ticks);
            events.push(GameEvent::GameOver);
        }
        Some(wall) => events.push(GameEvent::WallBounce(wall)),
        None => {}
    }

    state.platform.advance(&mut state.ball, &state.world);
    state.ball.advance();

    events
}

fn collide_blocks(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let before = events.len();

    match state.block_collision {
        BlockCollision::EachHit => {
            for (index, block) in state.blocks.iter_mut().enumerate() {
                if block.active && state.ball.collides(&block.rect) {
                    state.ball.bump_block(block);
                    events.push(GameEvent::BlockDestroyed { index });
                }
            }
        }
        BlockCollision::Deepest => {
            let lookahead = state.ball.lookahead();
            // Ties go to the lower index
            let deepest = state
                .blocks
                .iter()
                .enumerate()
                .filter(|(_, b)| b.active)
                .map(|(i, b)| (i, lookahead.penetration(&b.rect)))
                .filter(|&(_, depth)| depth > 0.0)
                .fold(None, |best: Option<(usize, f32)>, (i, depth)| match best {
                    Some((_, d)) if d >= depth => best,
                    _ => Some((i, depth)),
                });

            if let Some((index, _)) = deepest {
                state.ball.bump_block(&mut state.blocks[index]);
                events.push(GameEvent::BlockDestroyed { index });
            }
        }
    }

    let destroyed = events.len() - before;
    if destroyed > 0 {
        log::debug!("Tick {}: {} block(s) destroyed", state.time_ticks, destroyed);
        if state.is_cleared() {
            log::info!("All blocks destroyed");
            events.push(GameEvent::BoardCleared);
        }
    }
}

fn collide_platform(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.ball.collides(&state.platform.bounds()) {
        return;
    }
    if let Some(offset) = state.ball.bump_platform(&state.platform) {
        events.push(GameEvent::PlatformBounce { offset });
    }
}
