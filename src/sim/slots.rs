//! Three-reel slot machine with a fixed spin budget
//!
//! A spin's symbols and payout are decided the moment it is requested. The
//! reels then flicker and settle one after another; the payout is credited
//! and the budget decremented once the whole spin has played out. All timing
//! runs on accumulated frame delta.

use rand_pcg::Pcg32;

use crate::engine::{GameEnd, Simulation};
use crate::render::{BACKGROUND, HUD_TEXT, Surface};
use crate::sim::rng::{RandomSource, RngState};
use crate::sim::tables::{PRIMARY_SYMBOL, SEVEN_SYMBOL, SYMBOLS};

pub const SURFACE_WIDTH: f32 = 320.0;
pub const SURFACE_HEIGHT: f32 = 200.0;

pub const SPIN_BUDGET: u32 = 10;
/// Time from request to credit
pub const SPIN_DURATION_MS: f32 = 1600.0;
/// First reel settles here, each later reel [`REEL_STAGGER_MS`] after
pub const REEL_SETTLE_MS: f32 = 1000.0;
pub const REEL_STAGGER_MS: f32 = 200.0;
/// Symbol change period while a reel is still spinning
pub const FLICKER_MS: f32 = 80.0;

const REEL_COUNT: usize = 3;
const REEL_WIDTH: f32 = 70.0;
const REEL_HEIGHT: f32 = 80.0;
const REEL_GAP: f32 = 20.0;
const REEL_TOP: f32 = 40.0;
const WIN_TEXT: &str = "#ffd700";

/// Outcome class of a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinKind {
    /// Three primary-credit symbols
    PrimaryJackpot,
    SevenJackpot,
    /// Three of any other symbol
    Triple(usize),
    Pair,
    Miss,
}

impl WinKind {
    pub fn evaluate(reels: [usize; REEL_COUNT]) -> Self {
        let [a, b, c] = reels;
        if a == b && b == c {
            match a {
                PRIMARY_SYMBOL => WinKind::PrimaryJackpot,
                SEVEN_SYMBOL => WinKind::SevenJackpot,
                other => WinKind::Triple(other),
            }
        } else if a == b || b == c || a == c {
            WinKind::Pair
        } else {
            WinKind::Miss
        }
    }

    /// Payout at level 1
    pub fn base_payout(self) -> u64 {
        match self {
            WinKind::PrimaryJackpot => 500,
            WinKind::SevenJackpot => 300,
            WinKind::Triple(_) => 150,
            WinKind::Pair => 50,
            WinKind::Miss => 0,
        }
    }

    /// Banner shown after a winning spin
    pub fn label(self) -> Option<String> {
        match self {
            WinKind::PrimaryJackpot => Some("ZWAP JACKPOT!".to_string()),
            WinKind::SevenJackpot => Some("LUCKY SEVENS!".to_string()),
            WinKind::Triple(symbol) => {
                let name = SYMBOLS.get(symbol).map_or("?", |s| s.name);
                Some(format!("Triple {name}!"))
            }
            WinKind::Pair => Some("Pair!".to_string()),
            WinKind::Miss => None,
        }
    }
}

/// Score awarded for a reel result at `level`
pub fn payout(reels: [usize; REEL_COUNT], level: u32) -> u64 {
    WinKind::evaluate(reels).base_payout() * u64::from(level)
}

/// Spin requests queued between ticks
#[derive(Debug, Clone, Default)]
pub struct SpinInput {
    pub spin: bool,
}

impl SpinInput {
    pub fn request(&mut self) {
        self.spin = true;
    }
}

/// A spin that has been decided but not yet credited
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub result: [usize; REEL_COUNT],
    pub win: WinKind,
    pub payout: u64,
    pub elapsed_ms: f32,
}

#[derive(Debug, Clone)]
pub struct SlotState<R = Pcg32> {
    pub level: u32,
    pub score: u64,
    pub spins_remaining: u32,
    /// Last settled result
    pub reels: [usize; REEL_COUNT],
    pub spinning: Option<Spin>,
    pub last_win: Option<WinKind>,
    pub over: bool,
    rng: R,
}

impl SlotState<Pcg32> {
    pub fn new(level: u32, seed: u64) -> Self {
        Self::with_rng(level, RngState::new(seed).to_rng())
    }
}

impl<R: RandomSource> SlotState<R> {
    pub fn with_rng(level: u32, rng: R) -> Self {
        Self {
            level,
            score: 0,
            spins_remaining: SPIN_BUDGET,
            reels: [0; REEL_COUNT],
            spinning: None,
            last_win: None,
            over: false,
            rng,
        }
    }

    /// Start a spin. Ignored while a spin is in flight or the budget is spent.
    pub fn request_spin(&mut self) -> bool {
        if self.over || self.spinning.is_some() || self.spins_remaining == 0 {
            return false;
        }
        let len = SYMBOLS.len();
        let result = [self.rng.pick(len), self.rng.pick(len), self.rng.pick(len)];
        let win = WinKind::evaluate(result);
        let payout = win.base_payout() * u64::from(self.level);
        log::debug!("Spin {result:?} -> {win:?} ({payout})");

        self.last_win = None;
        self.spinning = Some(Spin {
            result,
            win,
            payout,
            elapsed_ms: 0.0,
        });
        true
    }

    pub fn tick(&mut self, input: &SpinInput, dt_ms: f32) -> Option<GameEnd> {
        if self.over {
            return None;
        }
        if input.spin {
            self.request_spin();
        }

        let spin = self.spinning.as_mut()?;
        spin.elapsed_ms += dt_ms.max(0.0);
        if spin.elapsed_ms < SPIN_DURATION_MS {
            return None;
        }

        let spin = *spin;
        self.spinning = None;
        self.reels = spin.result;
        self.score += spin.payout;
        self.spins_remaining = self.spins_remaining.saturating_sub(1);
        self.last_win = (spin.payout > 0).then_some(spin.win);

        if self.spins_remaining == 0 {
            self.over = true;
            return Some(GameEnd {
                score: self.score,
                secondary: 0,
                level: self.level,
                cleared: false,
            });
        }
        None
    }

    /// Symbol currently shown on reel `index`. Reels still spinning cycle
    /// deterministically from their target so the logical RNG is untouched.
    pub fn displayed_symbol(&self, index: usize) -> usize {
        let Some(spin) = &self.spinning else {
            return self.reels.get(index).copied().unwrap_or(0);
        };
        let target = spin.result.get(index).copied().unwrap_or(0);
        let settle_at = REEL_SETTLE_MS + index as f32 * REEL_STAGGER_MS;
        if spin.elapsed_ms >= settle_at {
            target
        } else {
            let step = (spin.elapsed_ms / FLICKER_MS) as usize;
            (target + step) % SYMBOLS.len()
        }
    }
}

impl<R: RandomSource> Simulation for SlotState<R> {
    type Input = SpinInput;

    fn step(&mut self, input: &SpinInput, dt_ms: f32) -> Option<GameEnd> {
        self.tick(input, dt_ms)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);
        surface.fill_text(
            &format!("Spins: {}   Score: {}", self.spins_remaining, self.score),
            8.0,
            16.0,
            HUD_TEXT,
        );

        let total = REEL_COUNT as f32 * REEL_WIDTH + (REEL_COUNT - 1) as f32 * REEL_GAP;
        let left = (SURFACE_WIDTH - total) / 2.0;
        for index in 0..REEL_COUNT {
            let symbol = &SYMBOLS[self.displayed_symbol(index) % SYMBOLS.len()];
            let x = left + index as f32 * (REEL_WIDTH + REEL_GAP);
            surface.stroke_rect(x, REEL_TOP, REEL_WIDTH, REEL_HEIGHT, symbol.color);
            surface.fill_text(
                symbol.label,
                x + REEL_WIDTH / 2.0 - 6.0,
                REEL_TOP + REEL_HEIGHT / 2.0 + 6.0,
                symbol.color,
            );
        }

        if let Some(label) = self.last_win.and_then(WinKind::label) {
            surface.fill_text(&label, left, REEL_TOP + REEL_HEIGHT + 30.0, WIN_TEXT);
        }

        let prompt = if self.spinning.is_some() {
            "Spinning..."
        } else if self.spins_remaining == 0 {
            "No Spins Left"
        } else {
            "SPIN"
        };
        surface.fill_text(prompt, left, SURFACE_HEIGHT - 12.0, HUD_TEXT);
    }

    fn is_over(&self) -> bool {
        self.over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;
    use crate::sim::rng::ScriptedSource;

    fn spin_to_completion<R: RandomSource>(state: &mut SlotState<R>) -> Option<GameEnd> {
        let request = SpinInput { spin: true };
        let mut end = state.tick(&request, 0.0);
        let idle = SpinInput::default();
        while state.spinning.is_some() {
            end = end.or(state.tick(&idle, 100.0));
        }
        end
    }

    #[test]
    fn test_payout_table() {
        assert_eq!(payout([0, 0, 0], 3), 1500);
        assert_eq!(payout([2, 2, 2], 1), 300);
        assert_eq!(payout([4, 4, 4], 2), 300);
        assert_eq!(payout([1, 3, 1], 2), 100);
        assert_eq!(payout([5, 5, 0], 1), 50);
        assert_eq!(payout([0, 1, 2], 9), 0);
    }

    #[test]
    fn test_win_labels() {
        assert_eq!(WinKind::evaluate([3, 3, 3]).label().as_deref(), Some("Triple Diamond!"));
        assert_eq!(WinKind::evaluate([0, 0, 0]).label().as_deref(), Some("ZWAP JACKPOT!"));
        assert_eq!(WinKind::Miss.label(), None);
    }

    #[test]
    fn test_primary_jackpot_credited_after_spin() {
        let mut state = SlotState::with_rng(3, ScriptedSource::new([0, 0, 0]));
        assert!(state.tick(&SpinInput { spin: true }, 0.0).is_none());
        assert_eq!(state.score, 0, "credit waits for the spin to finish");
        assert_eq!(state.spins_remaining, SPIN_BUDGET);

        state.tick(&SpinInput::default(), SPIN_DURATION_MS);
        assert_eq!(state.score, 1500);
        assert_eq!(state.spins_remaining, SPIN_BUDGET - 1);
        assert_eq!(state.last_win, Some(WinKind::PrimaryJackpot));
    }

    #[test]
    fn test_spin_ignored_while_spinning() {
        let mut state = SlotState::with_rng(1, ScriptedSource::new([0, 1, 2, 3, 4, 5]));
        assert!(state.request_spin());
        assert!(!state.request_spin());
        assert_eq!(state.spinning.map(|s| s.result), Some([0, 1, 2]));
    }

    #[test]
    fn test_reels_settle_in_order() {
        let mut state = SlotState::with_rng(1, ScriptedSource::new([4, 1, 5]));
        state.request_spin();
        let idle = SpinInput::default();

        state.tick(&idle, REEL_SETTLE_MS);
        assert_eq!(state.displayed_symbol(0), 4);
        // 1000 / 80 = 12 flicker steps past the target
        assert_eq!(state.displayed_symbol(1), (1 + 12) % SYMBOLS.len());

        state.tick(&idle, 2.0 * REEL_STAGGER_MS);
        assert_eq!(state.displayed_symbol(1), 1);
        assert_eq!(state.displayed_symbol(2), 5);
    }

    #[test]
    fn test_budget_ends_session_once() {
        let mut state = SlotState::new(2, 77);
        let mut ends = Vec::new();
        for _ in 0..SPIN_BUDGET {
            if let Some(end) = spin_to_completion(&mut state) {
                ends.push(end);
            }
        }

        assert_eq!(state.spins_remaining, 0);
        assert!(state.is_over());
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].score, state.score);
        assert_eq!(ends[0].secondary, 0);
        assert!(!ends[0].cleared);

        // Nothing more to spin
        assert!(!state.request_spin());
        assert!(state.tick(&SpinInput { spin: true }, 5000.0).is_none());
    }

    #[test]
    fn test_draw_prompt() {
        let mut state = SlotState::new(1, 5);
        let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
        state.draw(&mut surface);
        assert!(surface.texts().contains(&"SPIN"));

        state.request_spin();
        state.draw(&mut surface);
        assert!(surface.texts().contains(&"Spinning..."));
    }
}
