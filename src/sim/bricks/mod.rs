//! Brick-breaker: paddle, ball and a 5x8 brick wall on a 320x480 surface

pub mod state;
pub mod tick;

pub use state::{Ball, Brick, BrickPhase, BrickState, Paddle};
pub use tick::{BrickInput, autopilot_x, tick};

use crate::engine::{GameEnd, Simulation};
use crate::render::{BACKGROUND, HUD_TEXT, Surface};

const PADDLE_COLOR: &str = "#00f5ff";
const BALL_COLOR: &str = "#ff00ff";

impl Simulation for BrickState {
    type Input = BrickInput;

    fn step(&mut self, input: &BrickInput, _dt_ms: f32) -> Option<GameEnd> {
        tick(self, input)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);

        for brick in self.bricks.iter().filter(|b| b.alive) {
            let r = brick.rect;
            surface.fill_rect(r.x, r.y, r.w, r.h, &brick.color);
        }

        let p = self.paddle.rect;
        surface.fill_rect(p.x, p.y, p.w, p.h, PADDLE_COLOR);
        surface.fill_circle(self.ball.pos.x, self.ball.pos.y, self.ball.radius, BALL_COLOR);

        let (width, _) = surface.size();
        surface.fill_text(
            &format!("Score: {} | Lvl: {}", self.score, self.level),
            8.0,
            16.0,
            HUD_TEXT,
        );
        surface.fill_text(&"♥".repeat(usize::from(self.lives)), width - 50.0, 16.0, HUD_TEXT);
    }

    fn is_over(&self) -> bool {
        !self.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    #[test]
    fn test_draw_frame() {
        let state = BrickState::new(3);
        let mut surface = RecordingSurface::new(state::SURFACE_WIDTH, state::SURFACE_HEIGHT);
        state.draw(&mut surface);

        // Every brick plus the paddle
        assert_eq!(surface.filled_rects(), state.bricks.len() + 1);
        assert_eq!(surface.texts(), vec!["Score: 0 | Lvl: 3", "♥♥♥"]);
    }
}
