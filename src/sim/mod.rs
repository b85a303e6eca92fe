//! Deterministic game simulations
//!
//! All gameplay rules live here. Nothing in this module touches the
//! browser: randomness comes in through [`RandomSource`], time through the
//! frame delta, and drawing goes out through [`crate::render::Surface`].

pub mod blocks;
pub mod bricks;
pub mod collision;
pub mod rng;
pub mod slots;
pub mod tables;

pub use blocks::{BlockInput, BlockState, Command};
pub use bricks::{BrickInput, BrickState};
pub use rng::{RandomSource, RngState, ScriptedSource};
pub use slots::{SlotState, SpinInput, WinKind};
pub use tables::{SYMBOLS, ShapeKind, SlotSymbol};
