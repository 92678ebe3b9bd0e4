//! Connecting dots simulation
//!
//! A fixed lattice of dots. The dot nearest the pointer (within reach) lights
//! up, and moving from one lit dot to another leaves a trace line between
//! them that fades out over a few seconds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::{SimPhase, Simulation, TickContext};
use super::fade::{is_expired, timed_opacity};
use super::viewport::Viewport;
use crate::finite_or;
use crate::settings::GridTuning;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridDot {
    pub pos: Vec2,
    /// Diameter at rest
    pub base_size: f32,
    /// Current diameter
    pub size: f32,
    pub active: bool,
}

/// Trace line between two dots, by index
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathEdge {
    pub start: usize,
    pub end: usize,
    pub created_ms: f64,
    pub opacity: f32,
}

/// Lattice layout derived from the surface size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub margin: f32,
    pub connect_distance: f32,
    pub dot_size: f32,
    pub cell: Vec2,
}

impl GridMetrics {
    pub fn compute(viewport: Viewport, tuning: &GridTuning) -> Self {
        let min_side = viewport.min_side();
        let margin = min_side * tuning.margin_ratio;
        let usable = viewport.size() - Vec2::splat(2.0 * margin);
        let spans = Vec2::new(
            tuning.cols.saturating_sub(1) as f32,
            tuning.rows.saturating_sub(1) as f32,
        );
        Self {
            margin,
            connect_distance: finite_or(min_side / tuning.connect_divisor, 0.0),
            dot_size: finite_or(min_side / tuning.dot_divisor, 0.0),
            cell: Vec2::new(
                finite_or(usable.x / spans.x, 0.0),
                finite_or(usable.y / spans.y, 0.0),
            ),
        }
    }
}

/// Dot grid state
#[derive(Debug, Clone)]
pub struct DotGrid {
    tuning: GridTuning,
    viewport: Viewport,
    metrics: GridMetrics,
    dots: Vec<GridDot>,
    edges: Vec<PathEdge>,
    last_active: Option<usize>,
}

impl DotGrid {
    pub fn new(viewport: Viewport, tuning: GridTuning) -> Self {
        let mut grid = Self {
            metrics: GridMetrics::compute(viewport, &tuning),
            tuning,
            viewport,
            dots: Vec::new(),
            edges: Vec::new(),
            last_active: None,
        };
        grid.rebuild();
        grid
    }

    pub fn dots(&self) -> &[GridDot] {
        &self.dots
    }

    pub fn edges(&self) -> &[PathEdge] {
        &self.edges
    }

    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    /// Index of the dot lit most recently
    pub fn last_active(&self) -> Option<usize> {
        self.last_active
    }

    pub fn tuning(&self) -> &GridTuning {
        &self.tuning
    }

    /// Column-major lattice, cols outer and rows inner
    fn rebuild(&mut self) {
        self.metrics = GridMetrics::compute(self.viewport, &self.tuning);
        let m = self.metrics;
        self.dots.clear();
        self.edges.clear();
        self.last_active = None;
        for col in 0..self.tuning.cols {
            for row in 0..self.tuning.rows {
                let pos = Vec2::splat(m.margin) + m.cell * Vec2::new(col as f32, row as f32);
                self.dots.push(GridDot {
                    pos,
                    base_size: m.dot_size,
                    size: m.dot_size,
                    active: false,
                });
            }
        }
        log::debug!(
            "Grid laid out: {} dots, reach {:.1}",
            self.dots.len(),
            m.connect_distance
        );
    }

    /// Closest dot strictly within reach of `pointer`
    pub fn nearest(&self, pointer: Vec2) -> Option<usize> {
        let mut best = None;
        let mut best_dist = self.metrics.connect_distance;
        for (i, dot) in self.dots.iter().enumerate() {
            let d = dot.pos.distance(pointer);
            if d < best_dist {
                best_dist = d;
                best = Some(i);
            }
        }
        best
    }
}

impl Simulation for DotGrid {
    fn phase(&self) -> SimPhase {
        SimPhase::Running
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Dots only come from the layout
    fn spawn_step(&mut self, _ctx: &TickContext) {}

    fn motion_step(&mut self, ctx: &TickContext) {
        for dot in self.dots.iter_mut() {
            dot.active = false;
            dot.size = dot.base_size;
        }

        let Some(current) = ctx.pointer.and_then(|p| self.nearest(p)) else {
            return;
        };
        let dot = &mut self.dots[current];
        dot.active = true;
        dot.size = dot.base_size * self.tuning.active_scale;

        if let Some(previous) = self.last_active {
            if previous != current {
                self.edges.push(PathEdge {
                    start: previous,
                    end: current,
                    created_ms: ctx.now_ms,
                    opacity: 1.0,
                });
            }
        }
        self.last_active = Some(current);
    }

    fn lifecycle_step(&mut self, ctx: &TickContext) {
        let fade = self.tuning.fade_ms;
        self.edges
            .retain(|e| !is_expired(ctx.now_ms - e.created_ms, fade));
        for edge in self.edges.iter_mut() {
            edge.opacity = timed_opacity(ctx.now_ms - edge.created_ms, fade);
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        log::info!("Grid resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.rebuild();
    }

    fn entity_count(&self) -> usize {
        self.dots.len() + self.edges.len()
    }
}
