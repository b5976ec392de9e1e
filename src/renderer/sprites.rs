//! Sprite catalogue and draw list generation

use glam::Vec2;
use serde::Serialize;

use crate::sim::{Aabb, GameState};

/// Images the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sprite {
    Background,
    Ball,
    Platform,
    Block,
}

impl Sprite {
    pub const ALL: [Sprite; 4] = [Sprite::Background, Sprite::Ball, Sprite::Platform, Sprite::Block];

    pub fn name(&self) -> &'static str {
        match self {
            Sprite::Background => "background",
            Sprite::Ball => "ball",
            Sprite::Platform => "platform",
            Sprite::Block => "block",
        }
    }

    /// Asset path relative to the host's root
    pub fn asset_path(&self) -> String {
        format!("img/{}.png", self.name())
    }
}

/// One image blit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawCmd {
    pub sprite: Sprite,
    /// Region of the image to copy; `None` draws the whole image
    pub src: Option<Aabb>,
    /// Top-left corner on the canvas
    pub dest: Vec2,
}

impl DrawCmd {
    fn whole(sprite: Sprite, dest: Vec2) -> Self {
        Self {
            sprite,
            src: None,
            dest,
        }
    }
}

/// Draw commands for the current state, back to front
///
/// Background, ball, platform, then every active block. The ball sprite is
/// clipped to the ball's size from the image's top-left corner.
pub fn draw_list(state: &GameState) -> Vec<DrawCmd> {
    let mut cmds = Vec::with_capacity(3 + state.blocks.len());

    cmds.push(DrawCmd::whole(Sprite::Background, Vec2::ZERO));
    cmds.push(DrawCmd {
        sprite: Sprite::Ball,
        src: Some(Aabb {
            pos: Vec2::ZERO,
            size: state.ball.size,
        }),
        dest: state.ball.pos,
    });
    cmds.push(DrawCmd::whole(Sprite::Platform, state.platform.pos));
    cmds.extend(
        state
            .active_blocks()
            .map(|block| DrawCmd::whole(Sprite::Block, block.rect.pos)),
    );

    cmds
}
