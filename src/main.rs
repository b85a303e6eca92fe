//! ZWAP! arcade entry point
//!
//! The browser build is driven from JS through `platform::web`. Natively
//! this runs each engine headless on autopilot and prints what the host
//! would submit, which is handy for checking tuning.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand_pcg::Pcg32;
    use zwap_arcade::consts::FIRST_FRAME_DT_MS;
    use zwap_arcade::render::RecordingSurface;
    use zwap_arcade::sim::blocks::{BlockState, Command};
    use zwap_arcade::sim::bricks::{BrickState, autopilot_x};
    use zwap_arcade::sim::rng::{RandomSource, RngState};
    use zwap_arcade::sim::slots::SlotState;
    use zwap_arcade::submission::{GameResult, StepClaim};
    use zwap_arcade::{
        GameEnd, GameKind, HighScores, MotionAccess, RewardQuote, Runner, Settings, Simulation, StepTracker, Tier,
    };

    /// Give up on a session after this many frames
    const FRAME_LIMIT: u64 = 200_000;

    /// Run `runner` until it ends, letting `drive` queue intents each frame
    fn play<S: Simulation>(runner: &mut Runner<S>, mut drive: impl FnMut(&mut Runner<S>)) -> Option<GameEnd> {
        let mut surface = RecordingSurface::new(0.0, 0.0);
        while runner.frames() < FRAME_LIMIT {
            drive(runner);
            let outcome = runner.frame(FIRST_FRAME_DT_MS, &mut surface);
            if let Some(pending) = outcome.ended {
                return Some(pending.end);
            }
            if !outcome.keep_running {
                break;
            }
            surface.commands.clear();
        }
        log::warn!("Session did not finish within {FRAME_LIMIT} frames");
        None
    }

    fn report(game: GameKind, end: GameEnd, tier: Tier, scores: &mut HighScores, timestamp: f64) {
        let result = GameResult::from_end(game, &end);
        if let Err(e) = result.validate(tier) {
            log::warn!("{e}");
        }
        match result.to_json() {
            Ok(json) => println!("{:<10} POST {} {json}", game.display_name(), GameResult::endpoint("demo")),
            Err(e) => log::error!("Failed to encode result: {e}"),
        }
        if game == GameKind::Bricks {
            let quote = RewardQuote::for_bricks(end.score, end.secondary);
            println!("{:<10} reward {:.2}", "", quote.amount_primary);
        }
        scores.record(game, &end, timestamp);
    }

    pub fn run(seed: u64) {
        let settings = Settings::load();
        // The demo plays every game, so report as a plus member
        let tier = Tier::Plus;
        let level = settings.level();
        let mut scores = HighScores::load();
        let mut driver: Pcg32 = RngState::new(seed).to_rng();

        log::info!("Headless run: seed={seed} level={level}");

        let mut bricks = Runner::headless(BrickState::new(level));
        if let Some(end) = play(&mut bricks, |runner| {
            let x = autopilot_x(runner.sim(), &mut driver);
            runner.input_mut().point(x);
        }) {
            report(GameKind::Bricks, end, tier, &mut scores, 1.0);
        }

        let mut blocks = Runner::headless(BlockState::new(level, seed));
        if let Some(end) = play(&mut blocks, |runner| {
            // A move every few frames, with the occasional hard drop
            if runner.frames() % 6 != 0 {
                return;
            }
            let command = match driver.pick(10) {
                0..=2 => Command::MoveLeft,
                3..=5 => Command::MoveRight,
                6 | 7 => Command::Rotate,
                8 => Command::SoftDrop,
                _ => Command::HardDrop,
            };
            runner.input_mut().push(command);
        }) {
            report(GameKind::FallingBlocks, end, tier, &mut scores, 2.0);
        }

        let mut slots = Runner::headless(SlotState::new(level, seed));
        if let Some(end) = play(&mut slots, |runner| {
            if runner.sim().spinning.is_none() {
                runner.input_mut().request();
            }
        }) {
            report(GameKind::Slots, end, tier, &mut scores, 3.0);
        }

        let mut tracker = StepTracker::new(settings.steps.clone());
        match tracker.start(MotionAccess::Unsupported) {
            Ok(mode) => {
                // Ten simulated minutes
                tracker.advance(10.0 * 60_000.0, &mut driver);
                let steps = tracker.stop();
                let quote = RewardQuote::for_steps(steps, settings.reward_multiplier());
                println!("{:<10} {steps} steps ({}), reward {:.2}", "MOVE", mode.as_str(), quote.amount_primary);
                match tracker.take_claim() {
                    Ok(claim) => match claim.validate() {
                        Ok(()) => println!("{:<10} POST {} {}", "", StepClaim::endpoint("demo"), claim.to_json().unwrap_or_default()),
                        Err(e) => log::warn!("{e}"),
                    },
                    Err(e) => log::warn!("{e}"),
                }
            }
            Err(e) => log::warn!("{e}"),
        }

        for game in GameKind::ALL {
            if let Some(top) = scores.top_score(game) {
                println!("{:<10} best {top}", game.display_name());
            }
        }
        scores.save();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(seed) => seed,
            Err(_) => {
                eprintln!("usage: zwap-arcade [seed]");
                std::process::exit(2);
            }
        },
        None => zwap_arcade::consts::DEFAULT_SEED,
    };
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}
