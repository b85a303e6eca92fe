//! 2D drawing surface
//!
//! Simulations draw through [`Surface`] so they never touch the browser
//! directly. The canvas implementation lives in `platform::canvas`;
//! [`RecordingSurface`] backs the headless demo and tests.

/// Background shared by every game
pub const BACKGROUND: &str = "#0a0b1e";
/// HUD text colour
pub const HUD_TEXT: &str = "#ffffff";

/// A canvas-like target with a fixed logical size
pub trait Surface {
    /// Logical (width, height) in surface units
    fn size(&self) -> (f32, f32);
    /// Fill the whole surface with one colour
    fn clear(&mut self, color: &str);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str);
    /// Draw a line of text with its baseline at `y`
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: &str);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { color: String },
    FillRect { x: f32, y: f32, w: f32, h: f32, color: String },
    StrokeRect { x: f32, y: f32, w: f32, h: f32, color: String },
    FillCircle { x: f32, y: f32, radius: f32, color: String },
    Text { text: String, x: f32, y: f32, color: String },
}

/// Surface that keeps the draw calls of the most recent frame
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// All text drawn since the last clear
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of filled rectangles since the last clear
    pub fn filled_rects(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::FillRect { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: &str) {
        // A clear starts a new frame
        self.commands.clear();
        self.commands.push(DrawCommand::Clear {
            color: color.to_string(),
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
        self.commands.push(DrawCommand::FillCircle {
            x,
            y,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: &str) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color: color.to_string(),
        });
    }
}
