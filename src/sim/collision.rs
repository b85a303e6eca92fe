//! Collision tests for the brick-breaker
//!
//! Everything here is axis-aligned in surface coordinates (y grows down).
//! Bricks only account for the ball radius vertically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Which side wall (if any) the ball has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallContact {
    None,
    Left,
    Right,
}

/// Side-wall test: the ball center left `[radius, width - radius]`
pub fn side_wall_contact(pos: Vec2, radius: f32, width: f32) -> WallContact {
    if pos.x <= radius {
        WallContact::Left
    } else if pos.x >= width - radius {
        WallContact::Right
    } else {
        WallContact::None
    }
}

/// Ceiling test
#[inline]
pub fn ceiling_contact(pos: Vec2, radius: f32) -> bool {
    pos.y <= radius
}

/// Paddle test.
///
/// The ball's vertical extent must overlap the paddle band and its center
/// must lie over the paddle. Returns where along the paddle it landed,
/// 0.0 at the left edge to 1.0 at the right.
pub fn paddle_hit_fraction(pos: Vec2, radius: f32, paddle: &Rect) -> Option<f32> {
    let overlaps_band = pos.y + radius >= paddle.y && pos.y - radius <= paddle.bottom();
    let over_paddle = pos.x >= paddle.x && pos.x <= paddle.right();
    if overlaps_band && over_paddle && paddle.w > 0.0 {
        Some(((pos.x - paddle.x) / paddle.w).clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Brick test: ball center against the brick's horizontal extent, ball
/// radius applied on the vertical axis only.
pub fn brick_contact(pos: Vec2, radius: f32, brick: &Rect) -> bool {
    pos.x >= brick.x
        && pos.x <= brick.right()
        && pos.y - radius <= brick.bottom()
        && pos.y + radius >= brick.y
}
