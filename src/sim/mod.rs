//! Deterministic simulation module
//!
//! All sketch logic lives here. This module must stay pure:
//! - Frame-counted cadence only (no wall clock except the grid's fade stamps)
//! - Injected, seedable RNG only
//! - Stable iteration order (insertion order is age order and draw order)
//! - No rendering or platform dependencies

pub mod bricks;
pub mod clock;
pub mod collision;
pub mod fade;
pub mod grid;
pub mod rng;
pub mod viewport;
pub mod vine;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use bricks::{Brick, BrickField, Drag, Particle};
pub use clock::{SimClock, SimPhase, Simulation, TickContext, TickInput};
pub use collision::{Landing, Rect, Support, find_landing};
pub use fade::{Dissolve, is_expired, timed_opacity};
pub use grid::{DotGrid, GridDot, GridMetrics, PathEdge};
pub use rng::{RngState, SimRng};
pub use viewport::Viewport;
pub use vine::{Leaf, Thorn, VineGarden, VineSegment};

use crate::settings::Settings;

/// Which of the three sketches a canvas runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SketchKind {
    Bricks,
    Vine,
    Grid,
}

impl SketchKind {
    pub const ALL: [SketchKind; 3] = [SketchKind::Bricks, SketchKind::Vine, SketchKind::Grid];

    pub fn as_str(&self) -> &'static str {
        match self {
            SketchKind::Bricks => "bricks",
            SketchKind::Vine => "vine",
            SketchKind::Grid => "grid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bricks" | "brick" => Some(SketchKind::Bricks),
            "vine" | "growing" => Some(SketchKind::Vine),
            "grid" | "dots" | "connecting" => Some(SketchKind::Grid),
            _ => None,
        }
    }

    /// DOM id of the canvas element hosting this sketch
    pub fn canvas_id(&self) -> &'static str {
        match self {
            SketchKind::Bricks => "brick-canvas",
            SketchKind::Vine => "growing-canvas",
            SketchKind::Grid => "connecting-canvas",
        }
    }
}

/// One running sketch
#[derive(Debug, Clone)]
pub enum Sketch {
    Bricks(BrickField),
    Vine(VineGarden),
    Grid(DotGrid),
}

impl Sketch {
    pub fn new(kind: SketchKind, viewport: Viewport, settings: &Settings, rng: SimRng) -> Self {
        match kind {
            SketchKind::Bricks => Sketch::Bricks(BrickField::new(
                viewport,
                settings.bricks.clone(),
                settings.max_particles(),
                rng,
            )),
            SketchKind::Vine => Sketch::Vine(VineGarden::new(viewport, settings.vine.clone(), rng)),
            SketchKind::Grid => Sketch::Grid(DotGrid::new(viewport, settings.grid.clone())),
        }
    }

    pub fn kind(&self) -> SketchKind {
        match self {
            Sketch::Bricks(_) => SketchKind::Bricks,
            Sketch::Vine(_) => SketchKind::Vine,
            Sketch::Grid(_) => SketchKind::Grid,
        }
    }

    pub fn as_sim(&self) -> &dyn Simulation {
        match self {
            Sketch::Bricks(s) => s,
            Sketch::Vine(s) => s,
            Sketch::Grid(s) => s,
        }
    }

    pub fn as_sim_mut(&mut self) -> &mut dyn Simulation {
        match self {
            Sketch::Bricks(s) => s,
            Sketch::Vine(s) => s,
            Sketch::Grid(s) => s,
        }
    }

    /// Every entity position, for bounds checks
    pub fn positions(&self) -> Vec<Vec2> {
        match self {
            Sketch::Bricks(f) => f
                .bricks()
                .iter()
                .map(|b| b.pos)
                .chain(f.particles().iter().map(|p| p.pos))
                .collect(),
            Sketch::Vine(v) => v
                .segments()
                .iter()
                .map(|s| s.pos)
                .chain(v.leaves().iter().map(|l| l.pos))
                .chain(v.thorns().iter().map(|t| t.pos))
                .collect(),
            Sketch::Grid(g) => g.dots().iter().map(|d| d.pos).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sketch_kind_parse() {
        for kind in SketchKind::ALL {
            assert_eq!(SketchKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SketchKind::parse("Connecting"), Some(SketchKind::Grid));
        assert_eq!(SketchKind::parse("tetris"), None);
    }

    #[test]
    fn test_sketch_dispatch() {
        let settings = Settings::default();
        let vp = Viewport::new(300, 200);
        for kind in SketchKind::ALL {
            let sketch = Sketch::new(kind, vp, &settings, SimRng::seeded(1));
            assert_eq!(sketch.kind(), kind);
            assert_eq!(sketch.as_sim().viewport(), vp);
            assert_eq!(sketch.as_sim().phase(), SimPhase::Running);
        }
    }
}
