//! Falling-block controls: discrete commands, key mapping and touch gestures

use serde::{Deserialize, Serialize};

/// Horizontal drag that moves the piece one column
pub const SWIPE_STEP: f32 = 30.0;
/// Downward drag that hard-drops the piece
pub const DROP_SWIPE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

/// Map a keyboard `key` value to a command
pub fn command_for_key(key: &str) -> Option<Command> {
    match key {
        "ArrowLeft" => Some(Command::MoveLeft),
        "ArrowRight" => Some(Command::MoveRight),
        "ArrowDown" => Some(Command::SoftDrop),
        "ArrowUp" => Some(Command::Rotate),
        " " => Some(Command::HardDrop),
        _ => None,
    }
}

/// Commands queued between ticks, applied in arrival order
#[derive(Debug, Clone, Default)]
pub struct BlockInput {
    pub commands: Vec<Command>,
}

impl BlockInput {
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}

/// Turns a touch drag into commands.
///
/// Each horizontal crossing of [`SWIPE_STEP`] moves one column and re-anchors
/// x. A downward drag past [`DROP_SWIPE`] hard-drops and re-anchors y. A touch
/// that never produced a command is a tap, which rotates.
#[derive(Debug, Clone, Default)]
pub struct TouchGesture {
    anchor: Option<(f32, f32)>,
    acted: bool,
}

impl TouchGesture {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.anchor = Some((x, y));
        self.acted = false;
    }

    /// Feed a move sample. Returns the commands it triggers.
    pub fn motion(&mut self, x: f32, y: f32) -> Vec<Command> {
        let mut out = Vec::new();
        let Some((ax, ay)) = self.anchor.as_mut() else {
            return out;
        };
        if !x.is_finite() || !y.is_finite() {
            return out;
        }

        let dx = x - *ax;
        if dx.abs() > SWIPE_STEP {
            out.push(if dx > 0.0 {
                Command::MoveRight
            } else {
                Command::MoveLeft
            });
            *ax = x;
        }
        if y - *ay > DROP_SWIPE {
            out.push(Command::HardDrop);
            *ay = y;
        }

        self.acted |= !out.is_empty();
        out
    }

    /// Finish the touch; a tap yields a rotation
    pub fn end(&mut self) -> Option<Command> {
        let was_tap = self.anchor.take().is_some() && !self.acted;
        self.acted = false;
        was_tap.then_some(Command::Rotate)
    }
}
