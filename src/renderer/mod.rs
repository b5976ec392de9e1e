//! Rendering boundary
//!
//! The simulation never draws. After each tick a host asks for a draw list
//! and hands it to whatever [`Renderer`] it owns; nothing here mutates state.

pub mod sprites;

pub use sprites::{DrawCmd, Sprite, draw_list};

/// Something that can paint a frame from a draw list
pub trait Renderer {
    fn present(&mut self, cmds: &[DrawCmd]);
}
