//! Keyboard mapping and command buffering
//!
//! Hosts deliver key events whenever they arrive; the queue holds them until
//! the next tick boundary so a command never lands in the middle of a tick.

use std::collections::VecDeque;

use crate::sim::{Command, Direction, GameEvent, GameState};

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
}

impl Key {
    /// DOM `keyCode` value
    pub const fn code(self) -> u32 {
        match self {
            Key::Left => 37,
            Key::Right => 39,
            Key::Space => 32,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            37 => Some(Key::Left),
            39 => Some(Key::Right),
            32 => Some(Key::Space),
            _ => None,
        }
    }

    /// From a DOM `KeyboardEvent.key` string
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            " " | "Spacebar" => Some(Key::Space),
            _ => None,
        }
    }
}

/// Raw key event carrying a key code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(u32),
    Up(u32),
}

/// Map a key event to a command
///
/// Releasing any key stops the platform, even keys that never started it.
pub fn command_for(event: KeyEvent) -> Option<Command> {
    match event {
        KeyEvent::Down(code) => match Key::from_code(code)? {
            Key::Space => Some(Command::Fire),
            Key::Left => Some(Command::Start(Direction::Left)),
            Key::Right => Some(Command::Start(Direction::Right)),
        },
        KeyEvent::Up(_) => Some(Command::Stop),
    }
}

/// Commands waiting for the next tick boundary, oldest first
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Queue the command for a key event; unmapped keys are dropped
    pub fn push_key(&mut self, event: KeyEvent) {
        match command_for(event) {
            Some(command) => self.push(command),
            None => log::trace!("Ignoring unmapped key event {:?}", event),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending command in arrival order
    pub fn drain_into(&mut self, state: &mut GameState) -> Vec<GameEvent> {
        self.pending
            .drain(..)
            .filter_map(|command| state.apply(command))
            .collect()
    }
}
