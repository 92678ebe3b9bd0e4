//! Falling brick simulation
//!
//! Bricks drop from above the surface, accelerate up to a capped speed and
//! stack on the floor line or on top of bricks that already landed. Landed
//! bricks can be dragged around with the pointer. Once the stack reaches the
//! top of the surface every brick crumbles into particles and fades away,
//! then the field starts over with a single brick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::{SimPhase, Simulation, TickContext};
use super::collision::{Rect, find_landing};
use super::fade::Dissolve;
use super::rng::SimRng;
use super::viewport::Viewport;
use crate::settings::BrickTuning;

/// A falling or landed brick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Downward speed in pixels per frame
    pub vel_y: f32,
    /// Set once the brick comes to rest; only a reset clears it
    pub landed: bool,
    /// 1.0 except while the field is dissolving
    pub opacity: f32,
}

impl Brick {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    fn land_at(&mut self, rest_y: f32) {
        self.pos.y = rest_y;
        self.landed = true;
    }
}

/// A crumb thrown off a brick when the field dissolves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// 0-255
    pub opacity: f32,
    /// Frames left to live
    pub life: f32,
}

/// The brick currently captured by the pointer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Drag {
    pub brick_id: u32,
    /// Pointer position relative to the brick's top-left corner at capture
    pub offset: Vec2,
    /// Latest pointer position while dragging
    pub target: Vec2,
}

/// Brick field state
#[derive(Debug, Clone)]
pub struct BrickField {
    tuning: BrickTuning,
    max_particles: usize,
    viewport: Viewport,
    rng: SimRng,
    phase: SimPhase,
    dissolve: Option<Dissolve>,
    bricks: Vec<Brick>,
    particles: Vec<Particle>,
    drag: Option<Drag>,
    /// Spawn on the next spawn step regardless of cadence (first brick)
    pending_spawn: bool,
    landing_height: f32,
    next_id: u32,
}

impl BrickField {
    pub fn new(viewport: Viewport, tuning: BrickTuning, max_particles: usize, rng: SimRng) -> Self {
        let landing_height = Self::compute_landing_height(&tuning, viewport);
        Self {
            tuning,
            max_particles,
            viewport,
            rng,
            phase: SimPhase::Running,
            dissolve: None,
            bricks: Vec::new(),
            particles: Vec::new(),
            drag: None,
            pending_spawn: true,
            landing_height,
            next_id: 1,
        }
    }

    fn compute_landing_height(tuning: &BrickTuning, viewport: Viewport) -> f32 {
        tuning
            .landing_height
            .unwrap_or(viewport.h() - tuning.floor_margin)
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Floor line the lowest bricks rest on
    pub fn landing_height(&self) -> f32 {
        self.landing_height
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    pub fn tuning(&self) -> &BrickTuning {
        &self.tuning
    }

    /// Insert a brick directly (used to stage scenes)
    pub fn push_brick(&mut self, pos: Vec2, landed: bool) -> u32 {
        let id = self.next_brick_id();
        self.bricks.push(Brick {
            id,
            pos,
            size: Vec2::new(self.tuning.width, self.tuning.height),
            vel_y: self.tuning.initial_speed_min,
            landed,
            opacity: 1.0,
        });
        id
    }

    fn next_brick_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn spawn_brick(&mut self) {
        let width = self.tuning.width;
        let x = self.rng.between(0.0, self.viewport.w() - width);
        let vel_y = self
            .rng
            .between(self.tuning.initial_speed_min, self.tuning.initial_speed_max);
        let id = self.next_brick_id();
        self.bricks.push(Brick {
            id,
            pos: Vec2::new(x, -self.tuning.height),
            size: Vec2::new(width, self.tuning.height),
            vel_y,
            landed: false,
            opacity: 1.0,
        });
        log::debug!("Spawned brick {} at x={:.1}", id, x);
    }

    fn dragged_id(&self) -> Option<u32> {
        self.drag.map(|d| d.brick_id)
    }

    /// A landed brick has reached the top band of the surface
    fn stack_reached_top(&self) -> bool {
        self.bricks
            .iter()
            .any(|b| b.landed && b.pos.y <= self.tuning.top_threshold)
    }

    /// Crumble every brick and start fading the field
    fn begin_dissolve(&mut self, frame: u64) {
        log::info!(
            "Brick stack reached the top ({} bricks), dissolving",
            self.bricks.len()
        );
        self.phase = SimPhase::Dissolving {
            started_frame: frame,
        };
        self.dissolve = Some(Dissolve::new(frame, self.tuning.dissolve_frames));
        self.drag = None;

        for i in 0..self.bricks.len() {
            self.bricks[i].opacity = 1.0;
            let rect = self.bricks[i].rect();
            self.crumble(rect);
        }
    }

    fn crumble(&mut self, rect: Rect) {
        let t = &self.tuning;
        let count = if t.particle_area > 0.0 {
            (rect.size.x * rect.size.y / t.particle_area).floor().max(0.0) as usize
        } else {
            0
        };
        let room = self.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let offset = Vec2::new(
                self.rng.between(0.0, rect.size.x),
                self.rng.between(0.0, rect.size.y),
            );
            let particle = Particle {
                pos: rect.min + offset,
                vel: Vec2::new(self.rng.between(-1.0, 1.0), self.rng.between(-2.0, 0.5)),
                size: self.rng.between(t.particle_size_min, t.particle_size_max),
                opacity: 255.0,
                life: self.rng.between(t.particle_life_min, t.particle_life_max),
            };
            self.particles.push(particle);
        }
    }

    fn update_particles(&mut self) {
        let gravity = self.tuning.particle_gravity;
        let fade = self.tuning.particle_fade;
        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.vel.y += gravity;
            p.opacity -= fade;
            p.life -= 1.0;
        }
        self.particles.retain(|p| p.life > 0.0 && p.opacity > 0.0);
    }

    fn reset(&mut self) {
        self.phase = SimPhase::Resetting;
        self.bricks.clear();
        self.particles.clear();
        self.drag = None;
        self.dissolve = None;
        self.pending_spawn = true;
        self.landing_height = Self::compute_landing_height(&self.tuning, self.viewport);
        self.phase = SimPhase::Running;
    }
}

impl Simulation for BrickField {
    fn phase(&self) -> SimPhase {
        self.phase
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn spawn_step(&mut self, ctx: &TickContext) {
        if self.viewport.is_degenerate() {
            return;
        }
        let every = self.tuning.spawn_every as u64;
        let on_cadence = every > 0 && ctx.frame % every == 0;
        if self.pending_spawn || on_cadence {
            self.pending_spawn = false;
            self.spawn_brick();
        }
    }

    fn motion_step(&mut self, ctx: &TickContext) {
        // Follow the pointer with the captured brick
        if let Some(drag) = self.drag {
            if let Some(brick) = self.bricks.iter_mut().find(|b| b.id == drag.brick_id) {
                brick.pos = drag.target - drag.offset;
            }
        }

        // Supports are taken from the start of the frame, so bricks landing
        // this frame do not catch others until the next one
        let supports: Vec<(usize, Rect)> = self
            .bricks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.landed)
            .map(|(i, b)| (i, b.rect()))
            .collect();

        let dragged = self.dragged_id();
        let floor_y = self.landing_height;
        let gravity = self.tuning.gravity;
        let max_speed = self.tuning.max_speed;

        for (i, brick) in self.bricks.iter_mut().enumerate() {
            if brick.landed || Some(brick.id) == dragged {
                continue;
            }
            let projected_y = brick.pos.y + brick.vel_y;
            let others = supports.iter().copied().filter(|(j, _)| *j != i);
            match find_landing(&brick.rect(), projected_y, floor_y, others) {
                Some(landing) => {
                    brick.land_at(landing.rest_y);
                    log::debug!("Brick {} landed at y={:.1}", brick.id, landing.rest_y);
                }
                None => {
                    brick.pos.y = projected_y;
                    brick.vel_y = (brick.vel_y + gravity).min(max_speed);
                }
            }
        }

        if self.stack_reached_top() {
            self.begin_dissolve(ctx.frame);
        }
    }

    fn lifecycle_step(&mut self, ctx: &TickContext) {
        self.update_particles();

        if let Some(dissolve) = self.dissolve {
            if dissolve.is_complete(ctx.frame) {
                log::info!("Brick field reset");
                self.reset();
            } else {
                let opacity = dissolve.opacity(ctx.frame);
                for brick in self.bricks.iter_mut() {
                    brick.opacity = opacity;
                }
            }
            return;
        }

        let limit = self.landing_height + self.tuning.cleanup_margin;
        self.bricks.retain(|b| b.pos.y < limit);
        if let Some(drag) = self.drag {
            if !self.bricks.iter().any(|b| b.id == drag.brick_id) {
                self.drag = None;
            }
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        log::info!("Brick field resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.reset();
    }

    fn entity_count(&self) -> usize {
        self.bricks.len() + self.particles.len()
    }

    fn pointer_pressed(&mut self, pos: Vec2) {
        if self.phase.is_dissolving() {
            return;
        }
        // Topmost (most recently added) landed brick under the pointer wins
        self.drag = self
            .bricks
            .iter()
            .rev()
            .find(|b| b.landed && b.rect().contains(pos))
            .map(|b| Drag {
                brick_id: b.id,
                offset: pos - b.pos,
                target: pos,
            });
        if let Some(drag) = self.drag {
            log::debug!("Captured brick {}", drag.brick_id);
        }
    }

    fn pointer_dragged(&mut self, pos: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = pos;
        }
    }

    fn pointer_released(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::{SimClock, TickInput};

    fn field() -> BrickField {
        BrickField::new(
            Viewport::new(400, 400),
            BrickTuning::default(),
            10_000,
            SimRng::seeded(11),
        )
    }

    fn run(field: &mut BrickField, clock: &mut SimClock, ticks: usize) {
        for _ in 0..ticks {
            clock.tick(field, &TickInput::default());
        }
    }

    #[test]
    fn test_first_tick_spawns_one_brick() {
        let mut f = field();
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 1);
        assert_eq!(f.bricks().len(), 1);
        let b = &f.bricks()[0];
        assert!(!b.landed);
        assert!(b.pos.x >= 0.0 && b.pos.x <= 340.0);
        // Moved once after spawning at -30
        assert!(b.pos.y > -30.0);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut f = field();
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 119);
        assert_eq!(f.bricks().len(), 1);
        run(&mut f, &mut clock, 1);
        assert_eq!(f.bricks().len(), 2);
    }

    #[test]
    fn test_brick_lands_on_floor() {
        let mut f = field();
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 400);
        let first = &f.bricks()[0];
        assert!(first.landed);
        assert_eq!(first.pos.y, 400.0 - 5.0 - 30.0);
    }

    #[test]
    fn test_velocity_is_capped() {
        let mut f = field();
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 150);
        for b in f.bricks() {
            assert!(b.vel_y <= 2.0 + f32::EPSILON);
        }
    }

    #[test]
    fn test_stacks_on_landed_brick() {
        let mut f = field();
        f.pending_spawn = false;
        f.push_brick(Vec2::new(100.0, 365.0), true);
        f.push_brick(Vec2::new(120.0, 300.0), false);
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 60);
        let top = &f.bricks()[1];
        assert!(top.landed);
        assert_eq!(top.pos.y, 335.0);
    }

    #[test]
    fn test_drag_moves_landed_brick_only() {
        let mut f = field();
        f.pending_spawn = false;
        let landed = f.push_brick(Vec2::new(100.0, 365.0), true);
        f.push_brick(Vec2::new(200.0, 100.0), false);

        // Falling bricks cannot be captured
        f.pointer_pressed(Vec2::new(210.0, 110.0));
        assert!(f.drag().is_none());

        f.pointer_pressed(Vec2::new(110.0, 370.0));
        assert_eq!(f.drag().map(|d| d.brick_id), Some(landed));
        f.pointer_dragged(Vec2::new(160.0, 250.0));

        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 1);
        let b = f.bricks().iter().find(|b| b.id == landed).unwrap();
        assert_eq!(b.pos, Vec2::new(150.0, 245.0));
        assert!(b.landed);

        f.pointer_released();
        assert!(f.drag().is_none());
        run(&mut f, &mut clock, 5);
        // Released brick stays where it was dropped
        let b = f.bricks().iter().find(|b| b.id == landed).unwrap();
        assert_eq!(b.pos, Vec2::new(150.0, 245.0));
    }

    #[test]
    fn test_reaching_top_dissolves_then_resets() {
        let mut f = field();
        f.pending_spawn = false;
        f.push_brick(Vec2::new(0.0, 365.0), true);
        f.push_brick(Vec2::new(100.0, 40.0), true);
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 1);
        assert!(f.phase().is_dissolving());
        assert_eq!(f.particles().len(), 2 * 72);
        assert_eq!(f.bricks().len(), 2);

        run(&mut f, &mut clock, 60);
        assert!(f.phase().is_dissolving());
        assert!((f.bricks()[0].opacity - 0.5).abs() < 1e-6);

        run(&mut f, &mut clock, 60);
        assert_eq!(f.phase(), SimPhase::Running);
        assert!(f.bricks().is_empty());
        assert!(f.particles().is_empty());

        // Field reseeds with a single brick on the next tick
        run(&mut f, &mut clock, 1);
        assert_eq!(f.bricks().len(), 1);
    }

    #[test]
    fn test_particle_cap_respected() {
        let mut f = BrickField::new(
            Viewport::new(400, 400),
            BrickTuning::default(),
            10,
            SimRng::seeded(2),
        );
        f.pending_spawn = false;
        f.push_brick(Vec2::new(0.0, 10.0), true);
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 1);
        assert_eq!(f.particles().len(), 10);
    }

    #[test]
    fn test_offscreen_bricks_removed() {
        let mut f = field();
        f.pending_spawn = false;
        f.push_brick(Vec2::new(0.0, 600.0), true);
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 1);
        assert!(f.bricks().is_empty());
    }

    #[test]
    fn test_landing_height_override_and_degenerate_surface() {
        let tuning = BrickTuning {
            landing_height: Some(200.0),
            ..BrickTuning::default()
        };
        let f = BrickField::new(Viewport::new(400, 400), tuning, 0, SimRng::seeded(1));
        assert_eq!(f.landing_height(), 200.0);

        let mut empty = BrickField::new(
            Viewport::new(0, 0),
            BrickTuning::default(),
            0,
            SimRng::seeded(1),
        );
        let mut clock = SimClock::new();
        run(&mut empty, &mut clock, 240);
        assert!(empty.bricks().is_empty());
    }

    #[test]
    fn test_resize_mid_dissolve_restarts() {
        let mut f = field();
        f.pending_spawn = false;
        f.push_brick(Vec2::new(100.0, 40.0), true);
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 1);
        assert!(f.phase().is_dissolving());
        assert!(!f.particles().is_empty());

        f.resize(Viewport::new(300, 200));
        assert_eq!(f.phase(), SimPhase::Running);
        assert!(f.dissolve.is_none());
        assert!(f.bricks().is_empty());
        assert!(f.particles().is_empty());

        run(&mut f, &mut clock, 1);
        assert_eq!(f.bricks().len(), 1);
        assert!(!f.bricks()[0].landed);
        assert_eq!(f.phase(), SimPhase::Running);
    }

    #[test]
    fn test_resize_clears_field() {
        let mut f = field();
        let mut clock = SimClock::new();
        run(&mut f, &mut clock, 300);
        f.resize(Viewport::new(200, 100));
        assert_eq!(f.entity_count(), 0);
        assert_eq!(f.landing_height(), 95.0);
    }
}
