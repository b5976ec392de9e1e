//! Game state and core simulation types
//!
//! All per-session state lives in [`GameState`]; the ball, the platform and
//! the block grid only ever touch each other through references handed in
//! by the tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::settings::{Settings, SettingsError};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball rides the platform, waiting for the fire control
    Idle,
    /// Ball in motion
    Playing,
    /// Ball left through the bottom of the world. Terminal.
    GameOver,
}

/// Horizontal control direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

/// Control input, applied strictly between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start moving the platform (held key)
    Start(Direction),
    /// Stop the platform (key released)
    Stop,
    /// Launch the ball off the platform
    Fire,
}

/// World edge the ball crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

/// Observable things that happened during a tick or command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball left the platform with this horizontal displacement
    Launched { dx: f32 },
    /// Block at this index in `GameState::blocks` was destroyed
    BlockDestroyed { index: usize },
    /// Ball bounced off the platform; `offset` is the clamped touch offset
    PlatformBounce { offset: f32 },
    /// Ball was snapped back inside the world
    WallBounce(Wall),
    /// Last active block destroyed
    BoardCleared,
    /// Ball lost through the bottom edge
    GameOver,
}

/// How a tick resolves a ball overlapping several blocks at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockCollision {
    /// Blocks are checked in index order and each overlapped one is destroyed
    /// and flips `dy`. Later blocks are tested against the lookahead with the
    /// already flipped `dy`.
    EachHit,
    /// Only the block with the largest overlap is destroyed; `dy` flips once
    #[default]
    Deepest,
}

/// The playfield `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(0.0, 0.0, self.width, self.height)
    }
}

/// A target block. Never reactivated once destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub active: bool,
    pub rect: Aabb,
}

impl Block {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            active: true,
            rect: Aabb::new(x, y, width, height),
        }
    }
}

/// The ball
///
/// `vel` is the signed per-tick displacement (`dx`, `dy`); `pos + vel` is
/// where the ball will be after the next [`Ball::advance`], and every
/// collision check runs against that lookahead box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Constant speed magnitude
    pub speed: f32,
}

impl Ball {
    /// Ball at rest at `pos`
    pub fn new(id: u32, pos: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            size,
            speed,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Bounding box at the next position
    pub fn lookahead(&self) -> Aabb {
        self.bounds().translated(self.vel)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Commit the pending displacement
    pub fn advance(&mut self) {
        if self.vel.y != 0.0 {
            self.pos.y += self.vel.y;
        }
        if self.vel.x != 0.0 {
            self.pos.x += self.vel.x;
        }
    }

    /// Whether the lookahead box strictly overlaps `rect`
    pub fn collides(&self, rect: &Aabb) -> bool {
        self.lookahead().overlaps(rect)
    }

    /// Reflect vertically and destroy the block
    pub fn bump_block(&mut self, block: &mut Block) {
        self.vel.y = -self.vel.y;
        block.active = false;
    }

    /// Bounce upward off the platform, steering by where the ball touched it
    ///
    /// Only acts while the ball is falling, so a ball still inside the
    /// platform's box on the following ticks is not bounced again.
    /// Returns the touch offset used.
    pub fn bump_platform(&mut self, platform: &Platform) -> Option<f32> {
        if self.vel.y <= 0.0 {
            return None;
        }
        self.vel.y = -self.speed;
        let offset = platform.touch_offset(self.center().x);
        self.vel.x = self.speed * offset;
        Some(offset)
    }

    /// Keep the ball inside the left, right and top edges
    ///
    /// At most one edge is handled per call, in the order left, right, top,
    /// bottom. Crossing the bottom is reported but not corrected.
    pub fn collide_world_bounds(&mut self, world: &World) -> Option<Wall> {
        let next = self.lookahead();

        if next.left() < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = self.speed;
            Some(Wall::Left)
        } else if next.right() > world.width {
            self.pos.x = world.width - self.size.x;
            self.vel.x = -self.speed;
            Some(Wall::Right)
        } else if next.top() < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.speed;
            Some(Wall::Top)
        } else if next.bottom() > world.height {
            Some(Wall::Bottom)
        } else {
            None
        }
    }

    /// Launch upward with a random whole-number horizontal component in
    /// `[-speed, speed]`. Returns the chosen `dx`.
    pub fn launch<R: Rng>(&mut self, rng: &mut R) -> f32 {
        let reach = (self.speed.trunc() as i32).max(0);
        self.vel.y = -self.speed;
        self.vel.x = rng.random_range(-reach..=reach) as f32;
        self.vel.x
    }
}

/// Whether the platform is still carrying the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallHold {
    /// Ball with this id rides the platform until fired
    Holding(u32),
    /// Ball is free. Irreversible.
    Released,
}

/// The player's platform. Moves horizontally only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal speed while a direction is held
    pub speed: f32,
    /// Current horizontal displacement: `-speed`, `0` or `speed`
    pub dx: f32,
    pub hold: BallHold,
    /// Clamp to the world's horizontal extent
    pub confined: bool,
}

impl Platform {
    pub fn new(pos: Vec2, size: Vec2, speed: f32, ball_id: u32) -> Self {
        Self {
            pos,
            size,
            speed,
            dx: 0.0,
            hold: BallHold::Holding(ball_id),
            confined: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn is_holding(&self, ball: &Ball) -> bool {
        self.hold == BallHold::Holding(ball.id)
    }

    pub fn start(&mut self, direction: Direction) {
        self.dx = match direction {
            Direction::Left => -self.speed,
            Direction::Right => self.speed,
        };
    }

    pub fn stop(&mut self) {
        self.dx = 0.0;
    }

    /// Move by `dx`, carrying the ball along while it is still held
    pub fn advance(&mut self, ball: &mut Ball, world: &World) {
        if self.dx == 0.0 {
            return;
        }

        let mut x = self.pos.x + self.dx;
        if self.confined {
            x = x.clamp(0.0, (world.width - self.size.x).max(0.0));
        }
        let applied = x - self.pos.x;
        self.pos.x = x;

        if self.is_holding(ball) {
            ball.pos.x += applied;
        }
    }

    /// Launch the held ball and let go of it for good
    ///
    /// Returns the launch `dx`, or `None` when the ball was already released.
    pub fn fire<R: Rng>(&mut self, ball: &mut Ball, rng: &mut R) -> Option<f32> {
        if !self.is_holding(ball) {
            return None;
        }
        let dx = ball.launch(rng);
        self.hold = BallHold::Released;
        Some(dx)
    }

    /// Where `x` falls along the platform: -1 at the left edge, 0 at the
    /// centre, 1 at the right edge. Unbounded outside the platform.
    pub fn raw_touch_offset(&self, x: f32) -> f32 {
        let diff = self.pos.x + self.size.x - x;
        let offset = self.size.x - diff;
        2.0 * offset / self.size.x - 1.0
    }

    /// [`Platform::raw_touch_offset`] clamped to `[-1, 1]`
    pub fn touch_offset(&self, x: f32) -> f32 {
        self.raw_touch_offset(x).clamp(-1.0, 1.0)
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub world: World,
    pub ball: Ball,
    pub platform: Platform,
    /// Row-major block grid
    pub blocks: Vec<Block>,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub block_collision: BlockCollision,
    #[serde(skip)]
    rng: Pcg32,
}

impl GameState {
    /// Default layout with the given seed
    pub fn new(seed: u64) -> Self {
        Self::build(&Settings {
            seed,
            ..Settings::default()
        })
    }

    /// Validate `settings` and lay out a fresh game from them
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: &Settings) -> Self {
        let ball = Ball::new(1, settings.ball_start, settings.ball_size, settings.ball_speed);
        let mut platform = Platform::new(
            settings.platform_start,
            settings.platform_size,
            settings.platform_speed,
            ball.id,
        );
        platform.confined = settings.confine_platform;

        Self {
            seed: settings.seed,
            world: World {
                width: settings.world_width,
                height: settings.world_height,
            },
            ball,
            platform,
            blocks: settings.build_grid(),
            phase: GamePhase::Idle,
            time_ticks: 0,
            block_collision: settings.block_collision,
            rng: Pcg32::seed_from_u64(settings.seed),
        }
    }

    /// Apply one control command. Must be called between ticks.
    pub fn apply(&mut self, command: Command) -> Option<GameEvent> {
        match command {
            Command::Start(direction) => {
                self.platform.start(direction);
                None
            }
            Command::Stop => {
                self.platform.stop();
                None
            }
            Command::Fire => {
                let dx = self.platform.fire(&mut self.ball, &mut self.rng)?;
                if self.phase == GamePhase::Idle {
                    self.phase = GamePhase::Playing;
                }
                log::info!("Ball launched (dx={dx}, dy={})", self.ball.vel.y);
                Some(GameEvent::Launched { dx })
            }
        }
    }

    pub fn active_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.active)
    }

    /// Every block destroyed
    pub fn is_cleared(&self) -> bool {
        self.blocks.iter().all(|b| !b.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn falling_ball(x: f32, y: f32) -> Ball {
        let mut ball = Ball::new(1, Vec2::new(x, y), Vec2::splat(BALL_SIZE), BALL_SPEED);
        ball.vel = Vec2::new(0.0, BALL_SPEED);
        ball
    }

    fn platform() -> Platform {
        Platform::new(
            Vec2::new(PLATFORM_START_X, PLATFORM_START_Y),
            Vec2::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
            PLATFORM_SPEED,
            1,
        )
    }

    fn world() -> World {
        World {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }

    #[test]
    fn test_advance_commits_velocity() {
        let mut ball = falling_ball(10.0, 10.0);
        ball.vel = Vec2::new(-3.0, 3.0);
        ball.advance();
        assert_eq!(ball.pos, Vec2::new(7.0, 13.0));

        let mut resting = Ball::new(1, Vec2::new(5.0, 5.0), Vec2::splat(20.0), 3.0);
        resting.advance();
        assert_eq!(resting.pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_collides_uses_lookahead() {
        let block = Block::new(100.0, 100.0, 60.0, 20.0);
        // Bottom edge touches block top now; one tick later it overlaps
        let ball = falling_ball(110.0, 80.0);
        assert!(!ball.bounds().overlaps(&block.rect));
        assert!(ball.collides(&block.rect));
    }

    #[test]
    fn test_collides_touching_edge_is_false() {
        let block = Block::new(100.0, 100.0, 60.0, 20.0);
        // Lookahead right edge lands exactly on block.x
        let mut ball = Ball::new(1, Vec2::new(77.0, 100.0), Vec2::splat(20.0), 3.0);
        ball.vel = Vec2::new(3.0, 0.0);
        assert_eq!(ball.lookahead().right(), block.rect.left());
        assert!(!ball.collides(&block.rect));
    }

    #[test]
    fn test_bump_block_flips_dy_keeps_dx() {
        let mut ball = falling_ball(0.0, 0.0);
        ball.vel = Vec2::new(2.0, -3.0);
        let mut block = Block::new(0.0, 0.0, 10.0, 10.0);
        ball.bump_block(&mut block);
        assert_eq!(ball.vel, Vec2::new(2.0, 3.0));
        assert!(!block.active);
    }

    #[test]
    fn test_bump_platform_when_falling() {
        let platform = platform();
        // Ball centre at platform x + 75 -> offset 0.5
        let mut ball = falling_ball(PLATFORM_START_X + 65.0, 283.0);
        let offset = ball.bump_platform(&platform);
        assert_eq!(offset, Some(0.5));
        assert_eq!(ball.vel.y, -BALL_SPEED);
        assert!((ball.vel.x - BALL_SPEED * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bump_platform_ignored_when_rising() {
        let platform = platform();
        let mut ball = falling_ball(PLATFORM_START_X, 283.0);
        ball.vel = Vec2::new(1.0, -3.0);
        let before = ball.clone();
        assert_eq!(ball.bump_platform(&platform), None);
        assert_eq!(ball, before);

        ball.vel = Vec2::new(1.0, 0.0);
        assert_eq!(ball.bump_platform(&platform), None);
        assert_eq!(ball.vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_touch_offset_edges_and_center() {
        let p = platform();
        assert_eq!(p.touch_offset(p.pos.x), -1.0);
        assert_eq!(p.touch_offset(p.pos.x + p.size.x), 1.0);
        assert_eq!(p.touch_offset(p.pos.x + p.size.x / 2.0), 0.0);
    }

    #[test]
    fn test_touch_offset_clamped_outside_span() {
        let p = platform();
        assert!(p.raw_touch_offset(p.pos.x - 10.0) < -1.0);
        assert_eq!(p.touch_offset(p.pos.x - 10.0), -1.0);
        assert!(p.raw_touch_offset(p.pos.x + p.size.x + 10.0) > 1.0);
        assert_eq!(p.touch_offset(p.pos.x + p.size.x + 10.0), 1.0);
    }

    #[test]
    fn test_world_bounds_left() {
        let mut ball = falling_ball(2.0, 100.0);
        ball.vel = Vec2::new(-3.0, 3.0);
        // Lookahead x = -1
        assert_eq!(ball.collide_world_bounds(&world()), Some(Wall::Left));
        assert_eq!(ball.pos.x, 0.0);
        assert_eq!(ball.vel.x, BALL_SPEED);
        assert_eq!(ball.vel.y, 3.0);
    }

    #[test]
    fn test_world_bounds_right() {
        let mut ball = falling_ball(WORLD_WIDTH - BALL_SIZE - 1.0, 100.0);
        ball.vel = Vec2::new(3.0, 3.0);
        assert_eq!(ball.collide_world_bounds(&world()), Some(Wall::Right));
        assert_eq!(ball.pos.x, WORLD_WIDTH - BALL_SIZE);
        assert_eq!(ball.vel.x, -BALL_SPEED);
    }

    #[test]
    fn test_world_bounds_left_wins_over_top() {
        let mut ball = falling_ball(1.0, 1.0);
        ball.vel = Vec2::new(-3.0, -3.0);
        assert_eq!(ball.collide_world_bounds(&world()), Some(Wall::Left));
        assert_eq!(ball.pos, Vec2::new(0.0, 1.0));
        assert_eq!(ball.vel, Vec2::new(BALL_SPEED, -3.0));
    }

    #[test]
    fn test_world_bounds_top_then_bottom() {
        let mut ball = falling_ball(100.0, 1.0);
        ball.vel = Vec2::new(0.0, -3.0);
        assert_eq!(ball.collide_world_bounds(&world()), Some(Wall::Top));
        assert_eq!(ball.pos.y, 0.0);
        assert_eq!(ball.vel.y, BALL_SPEED);

        let mut lost = falling_ball(100.0, WORLD_HEIGHT - BALL_SIZE);
        assert_eq!(lost.collide_world_bounds(&world()), Some(Wall::Bottom));
        // No correction for the bottom edge
        assert_eq!(lost.pos.y, WORLD_HEIGHT - BALL_SIZE);
        assert_eq!(lost.vel.y, BALL_SPEED);
    }

    #[test]
    fn test_platform_start_stop() {
        let mut p = platform();
        p.start(Direction::Left);
        assert_eq!(p.dx, -PLATFORM_SPEED);
        p.start(Direction::Left);
        assert_eq!(p.dx, -PLATFORM_SPEED);
        p.start(Direction::Right);
        assert_eq!(p.dx, PLATFORM_SPEED);
        p.stop();
        assert_eq!(p.dx, 0.0);
    }

    #[test]
    fn test_platform_carries_held_ball() {
        let mut p = platform();
        let mut ball = Ball::new(1, Vec2::new(BALL_START_X, BALL_START_Y), Vec2::splat(20.0), 3.0);
        p.start(Direction::Right);
        p.advance(&mut ball, &world());
        assert_eq!(p.pos.x, PLATFORM_START_X + PLATFORM_SPEED);
        assert_eq!(ball.pos.x, BALL_START_X + PLATFORM_SPEED);
        assert_eq!(p.pos.y, PLATFORM_START_Y);

        p.hold = BallHold::Released;
        p.advance(&mut ball, &world());
        assert_eq!(ball.pos.x, BALL_START_X + PLATFORM_SPEED);
    }

    #[test]
    fn test_platform_confined_to_world() {
        let mut p = platform();
        let mut ball = Ball::new(1, Vec2::new(BALL_START_X, BALL_START_Y), Vec2::splat(20.0), 3.0);
        p.pos.x = 2.0;
        ball.pos.x = 42.0;
        p.start(Direction::Left);
        p.advance(&mut ball, &world());
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(ball.pos.x, 40.0);

        p.confined = false;
        p.advance(&mut ball, &world());
        assert_eq!(p.pos.x, -PLATFORM_SPEED);
        assert_eq!(ball.pos.x, 40.0 - PLATFORM_SPEED);
    }

    #[test]
    fn test_fire_is_one_shot() {
        let mut p = platform();
        let mut ball = Ball::new(1, Vec2::new(BALL_START_X, BALL_START_Y), Vec2::splat(20.0), 3.0);
        let mut rng = Pcg32::seed_from_u64(7);

        let dx = p.fire(&mut ball, &mut rng).expect("first fire launches");
        assert_eq!(p.hold, BallHold::Released);
        assert_eq!(ball.vel.y, -3.0);
        assert_eq!(ball.vel.x, dx);

        let vel = ball.vel;
        assert_eq!(p.fire(&mut ball, &mut rng), None);
        assert_eq!(ball.vel, vel);
    }

    #[test]
    fn test_fire_scenario_from_rest() {
        let mut state = GameState::new(42);
        assert_eq!(state.ball.pos, Vec2::new(320.0, 280.0));
        assert_eq!(state.phase, GamePhase::Idle);

        let event = state.apply(Command::Fire);
        assert!(matches!(event, Some(GameEvent::Launched { .. })));
        assert_eq!(state.ball.vel.y, -3.0);
        assert_eq!(state.ball.vel.x.fract(), 0.0);
        assert!((-3.0..=3.0).contains(&state.ball.vel.x));
        assert_eq!(state.platform.hold, BallHold::Released);
        assert_eq!(state.phase, GamePhase::Playing);

        assert_eq!(state.apply(Command::Fire), None);
    }

    #[test]
    fn test_from_settings_rejects_negative_speed() {
        let settings = Settings {
            ball_speed: -3.0,
            ..Settings::default()
        };
        assert!(matches!(
            GameState::from_settings(&settings),
            Err(SettingsError::Invalid { field: "ball_speed", .. })
        ));
    }

    #[test]
    fn test_from_settings_uses_values() {
        let settings = Settings {
            seed: 9,
            grid_rows: 2,
            confine_platform: false,
            ..Settings::default()
        };
        let state = GameState::from_settings(&settings).unwrap();
        assert_eq!(state.seed, 9);
        assert_eq!(state.blocks.len(), 16);
        assert!(!state.platform.confined);
    }

    #[test]
    fn test_launch_with_negative_speed_goes_straight() {
        let mut ball = Ball::new(1, Vec2::ZERO, Vec2::splat(20.0), -3.0);
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(ball.launch(&mut rng), 0.0);
    }

    #[test]
    fn test_default_grid() {
        let state = GameState::new(1);
        assert_eq!(state.blocks.len(), 32);
        assert_eq!(state.active_blocks().count(), 32);
        assert!(!state.is_cleared());
        assert_eq!(state.blocks[0].rect, Aabb::new(65.0, 35.0, 60.0, 20.0));
        assert_eq!(state.blocks[9].rect, Aabb::new(129.0, 59.0, 60.0, 20.0));
    }

    proptest! {
        #[test]
        fn launch_dx_is_whole_and_in_range(seed in any::<u64>(), speed in 1u32..10) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let speed = speed as f32;
            let mut ball = Ball::new(1, Vec2::ZERO, Vec2::splat(20.0), speed);
            let dx = ball.launch(&mut rng);
            prop_assert_eq!(dx.fract(), 0.0);
            prop_assert!(dx >= -speed && dx <= speed);
            prop_assert_eq!(ball.vel.y, -speed);
        }

        #[test]
        fn touch_offset_stays_in_unit_range(x in -1000.0f32..1000.0) {
            let p = platform();
            let offset = p.touch_offset(x);
            prop_assert!((-1.0..=1.0).contains(&offset));
        }
    }
}
