//! Brick-breaker tick
//!
//! One call advances the session by one animation frame. The ball moves a
//! fixed distance per tick, so frame delta is not used here.

use super::state::{BrickPhase, BrickState, CLEAR_BONUS, BRICK_POINTS, PADDLE_STEER, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::engine::GameEnd;
use crate::sim::rng::RandomSource;
use crate::sim::collision::{WallContact, brick_contact, ceiling_contact, paddle_hit_fraction, side_wall_contact};

/// Intents queued between ticks
#[derive(Debug, Clone, Default)]
pub struct BrickInput {
    /// Latest pointer x in surface units
    pub pointer_x: Option<f32>,
}

impl BrickInput {
    /// Record a pointer sample. Malformed samples are dropped.
    pub fn point(&mut self, x: f32) {
        if x.is_finite() {
            self.pointer_x = Some(x);
        }
    }
}

/// Largest autopilot aim offset. Plus one tick of ball drift it must stay
/// under half the paddle width.
const AUTOPILOT_SPREAD: usize = 30;

/// Pointer x for a headless player that never misses. Each tick aims a
/// random distance off centre so paddle hits steer the ball.
pub fn autopilot_x(state: &BrickState, rng: &mut dyn RandomSource) -> f32 {
    let offset = rng.pick(2 * AUTOPILOT_SPREAD + 1) as f32 - AUTOPILOT_SPREAD as f32;
    state.ball.pos.x + offset
}

/// Advance the session by one tick
pub fn tick(state: &mut BrickState, input: &BrickInput) -> Option<GameEnd> {
    if !state.is_running() {
        return None;
    }
    state.time_ticks += 1;

    if let Some(x) = input.pointer_x.filter(|x| x.is_finite()) {
        state.paddle.follow(x);
    }

    let ball = &mut state.ball;
    ball.pos += ball.vel;

    match side_wall_contact(ball.pos, ball.radius, SURFACE_WIDTH) {
        WallContact::Left => ball.vel.x = ball.vel.x.abs(),
        WallContact::Right => ball.vel.x = -ball.vel.x.abs(),
        WallContact::None => {}
    }
    if ceiling_contact(ball.pos, ball.radius) {
        ball.vel.y = ball.vel.y.abs();
    }

    if let Some(hit) = paddle_hit_fraction(ball.pos, ball.radius, &state.paddle.rect) {
        ball.vel.y = -ball.vel.y.abs();
        ball.vel.x = PADDLE_STEER * (hit - 0.5);
    }

    // Every overlapping brick breaks this tick, each one flipping vy
    for brick in state.bricks.iter_mut().filter(|b| b.alive) {
        if brick_contact(ball.pos, ball.radius, &brick.rect) {
            brick.alive = false;
            ball.vel.y = -ball.vel.y;
            state.score += BRICK_POINTS;
            state.blocks_destroyed += 1;
        }
    }

    if ball.pos.y > SURFACE_HEIGHT {
        state.lives = state.lives.saturating_sub(1);
        if state.lives == 0 {
            state.phase = BrickPhase::GameOver;
            return Some(end_of(state, false));
        }
        log::debug!("Ball lost, {} lives left", state.lives);
        state.respawn_ball();
    }

    if state.bricks.iter().all(|b| !b.alive) {
        state.score += CLEAR_BONUS;
        state.phase = BrickPhase::Cleared;
        return Some(end_of(state, true));
    }

    None
}

fn end_of(state: &BrickState, cleared: bool) -> GameEnd {
    GameEnd {
        score: state.score,
        secondary: state.blocks_destroyed,
        level: state.level,
        cleared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bricks::state::*;
    use glam::Vec2;

    fn idle() -> BrickInput {
        BrickInput::default()
    }

    #[test]
    fn test_initial_layout() {
        let state = BrickState::new(1);
        assert_eq!(state.bricks.len(), BRICK_ROWS * BRICK_COLS);
        assert_eq!(state.lives, 3);
        assert_eq!(state.ball.vel, Vec2::new(4.0, -4.0));
        assert_eq!(state.paddle.rect.x + state.paddle.rect.w / 2.0, SURFACE_WIDTH / 2.0);
        assert!(state.ball.pos.y < state.paddle.rect.y);

        // Bricks stay inside the surface and above the paddle
        for brick in &state.bricks {
            assert!(brick.rect.x >= 0.0 && brick.rect.right() <= SURFACE_WIDTH);
            assert!(brick.rect.bottom() < state.paddle.rect.y / 2.0);
        }
    }

    #[test]
    fn test_paddle_follows_pointer_clamped() {
        let mut state = BrickState::new(1);
        let mut input = BrickInput::default();

        input.point(-50.0);
        tick(&mut state, &input);
        assert_eq!(state.paddle.rect.x, 0.0);

        input.point(1000.0);
        tick(&mut state, &input);
        assert_eq!(state.paddle.rect.x, SURFACE_WIDTH - PADDLE_WIDTH);

        // NaN samples never reach the state
        let mut bad = BrickInput::default();
        bad.point(f32::NAN);
        assert!(bad.pointer_x.is_none());
        tick(&mut state, &bad);
        assert_eq!(state.paddle.rect.x, SURFACE_WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn test_paddle_steering() {
        let mut state = BrickState::new(1);
        let paddle = state.paddle.rect;

        // Center hit goes straight up
        state.ball.vel = Vec2::new(3.0, 4.0);
        state.ball.pos = Vec2::new(paddle.x + paddle.w / 2.0 - 3.0, paddle.y - 6.0);
        tick(&mut state, &idle());
        assert!(state.ball.vel.y < 0.0);
        assert_eq!(state.ball.vel.x, 0.0);

        // Right edge angles sharply right
        state.ball.vel = Vec2::new(0.0, 4.0);
        state.ball.pos = Vec2::new(paddle.right(), paddle.y - 6.0);
        tick(&mut state, &idle());
        assert_eq!(state.ball.vel, Vec2::new(PADDLE_STEER / 2.0, -4.0));

        // Left edge angles sharply left
        state.ball.vel = Vec2::new(0.0, 4.0);
        state.ball.pos = Vec2::new(paddle.x, paddle.y - 6.0);
        tick(&mut state, &idle());
        assert_eq!(state.ball.vel.x, -PADDLE_STEER / 2.0);
    }

    #[test]
    fn test_walls_reflect() {
        let mut state = BrickState::new(1);
        state.ball.pos = Vec2::new(8.0, 300.0);
        state.ball.vel = Vec2::new(-4.0, 4.0);
        tick(&mut state, &idle());
        assert_eq!(state.ball.vel.x, 4.0);

        state.ball.pos = Vec2::new(160.0, 9.0);
        state.ball.vel = Vec2::new(0.0, -4.0);
        tick(&mut state, &idle());
        assert_eq!(state.ball.vel.y, 4.0);
    }

    #[test]
    fn test_brick_hit_scores() {
        let mut state = BrickState::new(1);
        // Just below the middle of the bottom row, moving up
        let target = state.bricks[(BRICK_ROWS - 1) * BRICK_COLS + 3].rect;
        state.ball.pos = Vec2::new(target.x + target.w / 2.0, target.bottom() + 10.0);
        state.ball.vel = Vec2::new(0.0, -4.0);

        tick(&mut state, &idle());
        assert_eq!(state.score, 10);
        assert_eq!(state.blocks_destroyed, 1);
        assert_eq!(state.bricks_alive(), BRICK_ROWS * BRICK_COLS - 1);
        assert_eq!(state.ball.vel.y, 4.0);
    }

    #[test]
    fn test_simultaneous_hits_each_count() {
        let mut state = BrickState::new(1);
        // Straddling the gap between rows 3 and 4 of one column
        let upper = state.bricks[3 * BRICK_COLS].rect;
        let gap_center = upper.bottom() + BRICK_GAP / 2.0;
        state.ball.pos = Vec2::new(upper.x + 5.0, gap_center + 4.0);
        state.ball.vel = Vec2::new(0.0, -4.0);

        tick(&mut state, &idle());
        assert_eq!(state.blocks_destroyed, 2);
        assert_eq!(state.score, 20);
        // Two flips cancel out
        assert_eq!(state.ball.vel.y, -4.0);
    }

    #[test]
    fn test_lives_and_single_game_over() {
        let mut state = BrickState::new(2);
        let mut ends = Vec::new();

        for _ in 0..3 {
            state.ball.pos = Vec2::new(10.0, SURFACE_HEIGHT - 2.0);
            state.ball.vel = Vec2::new(0.0, 20.0);
            if let Some(end) = tick(&mut state, &idle()) {
                ends.push(end);
            }
        }
        assert_eq!(state.phase, BrickPhase::GameOver);
        assert_eq!(state.lives, 0);

        // Ticks after the end change nothing
        let ticks = state.time_ticks;
        for _ in 0..10 {
            assert!(tick(&mut state, &idle()).is_none());
        }
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(
            ends,
            vec![GameEnd {
                score: 0,
                secondary: 0,
                level: 2,
                cleared: false
            }]
        );
    }

    #[test]
    fn test_respawn_after_lost_ball() {
        let mut state = BrickState::new(1);
        state.ball.pos = Vec2::new(10.0, SURFACE_HEIGHT - 2.0);
        state.ball.vel = Vec2::new(0.0, 20.0);
        assert!(tick(&mut state, &idle()).is_none());
        assert_eq!(state.lives, 2);
        assert_eq!(state.ball.vel, Vec2::new(4.0, -4.0));
        assert!(state.is_running());
    }

    #[test]
    fn test_autopilot_clears_the_board() {
        use crate::sim::rng::RngState;

        let mut state = BrickState::new(1);
        let mut rng = RngState::new(7).to_rng();
        let mut input = BrickInput::default();
        let mut end = None;
        for _ in 0..200_000 {
            input.point(autopilot_x(&state, &mut rng));
            if let Some(e) = tick(&mut state, &input) {
                end = Some(e);
                break;
            }
        }

        let end = end.expect("autopilot session finished");
        assert!(end.cleared);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(end.secondary, (BRICK_ROWS * BRICK_COLS) as u64);
    }

    #[test]
    fn test_centred_paddle_only_bounces_vertically() {
        let mut state = BrickState::new(1);
        let mut input = BrickInput::default();
        for _ in 0..2_000 {
            input.point(state.ball.pos.x);
            tick(&mut state, &input);
        }
        assert!(state.is_running());
        assert_eq!(state.ball.vel.x, 0.0);
    }

    #[test]
    fn test_clearing_board_adds_bonus() {
        let mut state = BrickState::new(1);
        for brick in state.bricks.iter_mut().skip(1) {
            brick.alive = false;
        }
        let last = state.bricks[0].rect;
        state.ball.pos = Vec2::new(last.x + 5.0, last.bottom() + 8.0);
        state.ball.vel = Vec2::new(0.0, -4.0);

        let end = tick(&mut state, &idle()).expect("board cleared");
        assert!(end.cleared);
        assert_eq!(end.score, BRICK_POINTS + CLEAR_BONUS);
        assert_eq!(end.secondary, 1);
        assert_eq!(state.phase, BrickPhase::Cleared);
        assert!(tick(&mut state, &idle()).is_none());
    }
}
