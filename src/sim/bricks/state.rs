//! Brick-breaker session state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::collision::Rect;

/// Logical surface size
pub const SURFACE_WIDTH: f32 = 320.0;
pub const SURFACE_HEIGHT: f32 = 480.0;

/// Brick grid
pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 8;
pub const BRICK_HEIGHT: f32 = 18.0;
pub const BRICK_GAP: f32 = 3.0;
/// Horizontal margin on each side of the grid
pub const BRICK_MARGIN_X: f32 = 15.0;
/// Top edge of the first row
pub const BRICK_TOP: f32 = 30.0;

/// Paddle defaults
pub const PADDLE_WIDTH: f32 = 80.0;
pub const PADDLE_HEIGHT: f32 = 10.0;
/// Distance from the paddle's top edge to the bottom of the surface
pub const PADDLE_BOTTOM_OFFSET: f32 = 25.0;

/// Ball defaults
pub const BALL_RADIUS: f32 = 7.0;
/// Launch speed on each axis (units/tick)
pub const BALL_START_SPEED: f32 = 4.0;
/// Spawn height above the bottom of the surface
pub const BALL_SPAWN_OFFSET: f32 = 45.0;
/// Horizontal speed range produced by paddle steering
pub const PADDLE_STEER: f32 = 6.0;

pub const STARTING_LIVES: u8 = 3;
pub const BRICK_POINTS: u64 = 10;
pub const CLEAR_BONUS: u64 = 500;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickPhase {
    Playing,
    /// Lives exhausted
    GameOver,
    /// Every brick destroyed
    Cleared,
}

/// The paddle. Its y never changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            rect: Rect::new(
                (SURFACE_WIDTH - PADDLE_WIDTH) / 2.0,
                SURFACE_HEIGHT - PADDLE_BOTTOM_OFFSET,
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
            ),
        }
    }
}

impl Paddle {
    /// Center the paddle under a pointer x, clamped to the surface
    pub fn follow(&mut self, pointer_x: f32) {
        let max_x = SURFACE_WIDTH - self.rect.w;
        self.rect.x = (pointer_x - self.rect.w / 2.0).clamp(0.0, max_x);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    pub radius: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::new(SURFACE_WIDTH / 2.0, SURFACE_HEIGHT - BALL_SPAWN_OFFSET),
            vel: Vec2::new(BALL_START_SPEED, -BALL_START_SPEED),
            radius: BALL_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub alive: bool,
    /// CSS colour
    pub color: String,
}

/// Complete brick-breaker session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrickState {
    pub level: u32,
    pub score: u64,
    pub lives: u8,
    pub blocks_destroyed: u64,
    pub phase: BrickPhase,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Row-major, top row first
    pub bricks: Vec<Brick>,
    pub time_ticks: u64,
}

impl BrickState {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            score: 0,
            lives: STARTING_LIVES,
            blocks_destroyed: 0,
            phase: BrickPhase::Playing,
            paddle: Paddle::default(),
            ball: Ball::default(),
            bricks: build_bricks(),
            time_ticks: 0,
        }
    }

    /// Put the ball back at its launch position and velocity
    pub fn respawn_ball(&mut self) {
        self.ball = Ball::default();
    }

    pub fn bricks_alive(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    pub fn is_running(&self) -> bool {
        self.phase == BrickPhase::Playing
    }
}

fn build_bricks() -> Vec<Brick> {
    let pitch = (SURFACE_WIDTH - 2.0 * BRICK_MARGIN_X) / BRICK_COLS as f32;
    let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
    for row in 0..BRICK_ROWS {
        let color = format!("hsl({}, 100%, {}%)", 180 + row * 25, 60 - row * 5);
        for col in 0..BRICK_COLS {
            bricks.push(Brick {
                rect: Rect::new(
                    BRICK_MARGIN_X + col as f32 * pitch,
                    BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
                    pitch - BRICK_GAP,
                    BRICK_HEIGHT,
                ),
                alive: true,
                color: color.clone(),
            });
        }
    }
    bricks
}
