//! Per-frame simulation driver
//!
//! Every simulation advances through the same fixed order each tick:
//! spawn, motion/collision, lifecycle. Spawn and motion are suspended while
//! a dissolve is in progress; lifecycle always runs so fades keep moving.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::viewport::Viewport;

/// Lifecycle phase of a simulation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Normal spawning and growth
    Running,
    /// Everything fading out; spawn and motion suspended
    Dissolving { started_frame: u64 },
    /// State being cleared and reseeded (never survives a tick)
    Resetting,
}

impl SimPhase {
    pub fn is_dissolving(&self) -> bool {
        matches!(self, SimPhase::Dissolving { .. })
    }
}

/// Host input sampled at the start of a tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Latest pointer/touch position in surface pixels
    pub pointer: Option<Vec2>,
    /// Host clock in milliseconds
    pub now_ms: f64,
}

/// Read-only view of the current tick handed to each step
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    /// Frame number since the last (re)initialization, starting at 1
    pub frame: u64,
    pub now_ms: f64,
    pub pointer: Option<Vec2>,
    /// Pointer is strictly inside the surface
    pub pointer_inside: bool,
}

/// Behavior shared by the brick, vine and dot grid simulations
pub trait Simulation {
    fn phase(&self) -> SimPhase;

    fn viewport(&self) -> Viewport;

    /// Create new entities on their cadence
    fn spawn_step(&mut self, ctx: &TickContext);

    /// Integrate motion and resolve collisions
    fn motion_step(&mut self, ctx: &TickContext);

    /// Age, fade and remove entities; drive the dissolve/reset transitions
    fn lifecycle_step(&mut self, ctx: &TickContext);

    /// Discard all state and rebuild for a new surface size
    fn resize(&mut self, viewport: Viewport);

    /// Number of live entities of every kind
    fn entity_count(&self) -> usize;

    fn pointer_pressed(&mut self, _pos: Vec2) {}

    fn pointer_dragged(&mut self, _pos: Vec2) {}

    fn pointer_released(&mut self) {}
}

/// Frame counter that sequences the steps of one simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    pub frame: u64,
    pub last_now_ms: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting frames from scratch (after a resize)
    pub fn reset(&mut self) {
        self.frame = 0;
    }

    /// Build the context for the next frame
    pub fn begin_frame(&mut self, input: &TickInput, viewport: Viewport) -> TickContext {
        self.frame += 1;
        self.last_now_ms = input.now_ms;
        TickContext {
            frame: self.frame,
            now_ms: input.now_ms,
            pointer: input.pointer,
            pointer_inside: input.pointer.is_some_and(|p| viewport.contains(p)),
        }
    }

    /// Advance a simulation by one frame in the fixed step order
    pub fn tick<S: Simulation + ?Sized>(&mut self, sim: &mut S, input: &TickInput) -> TickContext {
        let ctx = self.begin_frame(input, sim.viewport());
        if !sim.phase().is_dissolving() {
            sim.spawn_step(&ctx);
            sim.motion_step(&ctx);
        }
        sim.lifecycle_step(&ctx);
        ctx
    }
}
