//! Drawing surface abstraction
//!
//! The paint functions speak only this trait. Coordinates are surface pixels
//! with the origin at the top-left and y pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Immediate-mode 2D drawing target
pub trait Surface {
    /// Surface size in pixels
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface and discard anything drawn this frame
    fn clear(&mut self, color: Rgba);

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgba);

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgba);

    /// Open stroke through `points`
    fn polyline(&mut self, points: &[Vec2], width: f32, color: Rgba);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Filled simple polygon (convex or star-shaped about its first vertex)
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(Rgba),
    Rect { min: Vec2, size: Vec2, color: Rgba },
    Line { a: Vec2, b: Vec2, width: f32, color: Rgba },
    Polyline { points: Vec<Vec2>, width: f32, color: Rgba },
    Circle { center: Vec2, radius: f32, color: Rgba },
    Polygon { points: Vec<Vec2>, color: Rgba },
}

impl DrawCommand {
    pub fn color(&self) -> Rgba {
        match self {
            DrawCommand::Clear(color)
            | DrawCommand::Rect { color, .. }
            | DrawCommand::Line { color, .. }
            | DrawCommand::Polyline { color, .. }
            | DrawCommand::Circle { color, .. }
            | DrawCommand::Polygon { color, .. } => *color,
        }
    }
}

/// Surface that keeps the command list, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Rect { min, size, color });
    }

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line { a, b, width, color });
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }
}
