//! Growing vine simulation
//!
//! The vine starts at the middle of the left edge and grows one segment per
//! frame along a randomly wandering heading, curling away from the edges.
//! Leaves and thorns sprout some way behind the tip. Attached leaves sway,
//! detached ones fall off the bottom. Past a maximum length the whole plant
//! fades out and grows again from scratch.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::{SimPhase, Simulation, TickContext};
use super::fade::Dissolve;
use super::rng::SimRng;
use super::viewport::Viewport;
use crate::lerp_angle;
use crate::settings::VineTuning;

/// Rotation applied to falling leaves each frame
const FALLING_SPIN: f32 = 0.01;

/// One point of the vine polyline
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VineSegment {
    pub pos: Vec2,
    /// Growth direction when this segment was laid down
    pub heading: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    pub pos: Vec2,
    pub size: f32,
    pub angle: f32,
    /// `None` while attached; falling speed in pixels per frame otherwise
    pub fall_speed: Option<f32>,
    pub sway_phase: f32,
    pub sway_speed: f32,
    pub sway_amount: f32,
    pub stem_length: f32,
    pub opacity: f32,
}

impl Leaf {
    pub fn is_attached(&self) -> bool {
        self.fall_speed.is_none()
    }

    fn detach(&mut self, rng: &mut SimRng) {
        if self.is_attached() {
            self.fall_speed = Some(rng.between(1.0, 2.0));
        }
    }

    fn step(&mut self) {
        match self.fall_speed {
            Some(speed) => {
                self.pos.y += speed;
                self.angle += FALLING_SPIN;
            }
            None => {
                self.sway_phase += self.sway_speed;
                self.angle += self.sway_phase.sin() * self.sway_amount;
            }
        }
    }
}

/// Small triangular spike fixed to an older part of the vine
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thorn {
    pub pos: Vec2,
    pub angle: f32,
    pub length: f32,
    pub opacity: f32,
}

/// Vine state
#[derive(Debug, Clone)]
pub struct VineGarden {
    tuning: VineTuning,
    viewport: Viewport,
    rng: SimRng,
    phase: SimPhase,
    dissolve: Option<Dissolve>,
    segments: Vec<VineSegment>,
    leaves: Vec<Leaf>,
    thorns: Vec<Thorn>,
    /// Speed used for the latest growth step
    speed: f32,
}

impl VineGarden {
    pub fn new(viewport: Viewport, tuning: VineTuning, rng: SimRng) -> Self {
        let speed = tuning.base_speed;
        let mut garden = Self {
            tuning,
            viewport,
            rng,
            phase: SimPhase::Running,
            dissolve: None,
            segments: Vec::new(),
            leaves: Vec::new(),
            thorns: Vec::new(),
            speed,
        };
        garden.reset();
        garden
    }

    pub fn segments(&self) -> &[VineSegment] {
        &self.segments
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn thorns(&self) -> &[Thorn] {
        &self.thorns
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn tuning(&self) -> &VineTuning {
        &self.tuning
    }

    fn tip(&self) -> VineSegment {
        self.segments.last().copied().unwrap_or(VineSegment {
            pos: self.root(),
            heading: 0.0,
            opacity: 1.0,
        })
    }

    fn root(&self) -> Vec2 {
        Vec2::new(0.0, self.viewport.h() / 2.0)
    }

    fn reset(&mut self) {
        self.phase = SimPhase::Resetting;
        self.segments.clear();
        self.leaves.clear();
        self.thorns.clear();
        self.dissolve = None;
        self.speed = self.tuning.base_speed;
        self.segments.push(VineSegment {
            pos: self.root(),
            heading: 0.0,
            opacity: 1.0,
        });
        self.phase = SimPhase::Running;
    }

    fn spawn_leaf(&mut self) {
        let lag = self.tuning.leaf_anchor_lag;
        if self.segments.len() <= lag {
            return;
        }
        let anchor = self.segments[self.segments.len() - lag];
        let side = self.rng.sign();
        let angle = anchor.heading + side * PI / 2.5 + self.rng.between(-PI / 6.0, PI / 6.0);
        let fall_speed = if self.rng.chance(self.tuning.leaf_born_falling_chance) {
            Some(self.rng.between(0.5, 1.5))
        } else {
            None
        };
        self.leaves.push(Leaf {
            pos: anchor.pos,
            size: self.rng.between(15.0, 25.0),
            angle,
            fall_speed,
            sway_phase: self.rng.between(0.0, TAU),
            sway_speed: self.rng.between(0.005, 0.015),
            sway_amount: self.rng.between(0.005, 0.015),
            stem_length: self.rng.between(5.0, 12.0),
            opacity: 1.0,
        });
        log::debug!("Leaf sprouted ({} leaves)", self.leaves.len());
    }

    fn spawn_thorn(&mut self) {
        let len = self.segments.len();
        if len <= self.tuning.thorn_anchor_lag {
            return;
        }
        let jitter = self.rng.index(self.tuning.thorn_anchor_jitter).unwrap_or(0);
        let index = (len - self.tuning.thorn_anchor_lag).saturating_sub(jitter);
        let (Some(seg), Some(next)) = (self.segments.get(index), self.segments.get(index + 1))
        else {
            return;
        };
        let dir = next.pos - seg.pos;
        let along = crate::finite_or(dir.y.atan2(dir.x), seg.heading);
        let pos = seg.pos;
        let angle = along + self.rng.sign() * FRAC_PI_2;
        let length = self.rng.between(3.0, 5.0);
        self.thorns.push(Thorn {
            pos,
            angle,
            length,
            opacity: 1.0,
        });
    }

    /// Lay down the next segment
    fn grow(&mut self, pointer_inside: bool) {
        let t = &self.tuning;
        self.speed = if pointer_inside {
            t.hover_speed
        } else {
            t.base_speed
        };
        let step = self.speed * t.step_scale;
        let tip = self.tip();
        let mut heading = tip.heading + self.rng.between(-t.angle_variance, t.angle_variance);

        let ahead = tip.pos + Vec2::from_angle(heading) * step;
        let (w, h) = (self.viewport.w(), self.viewport.h());
        let margin = t.boundary_margin;
        if ahead.x < margin {
            heading = lerp_angle(heading, 0.0, t.edge_bias);
        } else if ahead.x > w - margin {
            heading = lerp_angle(heading, PI, t.edge_bias);
        }
        if ahead.y < margin {
            heading = lerp_angle(heading, FRAC_PI_2, t.edge_bias);
        } else if ahead.y > h - margin {
            heading = lerp_angle(heading, -FRAC_PI_2, t.edge_bias);
        }
        let heading = crate::normalize_angle(heading);

        let next = self.viewport.clamp(tip.pos + Vec2::from_angle(heading) * step);
        self.segments.push(VineSegment {
            pos: next,
            heading,
            opacity: 1.0,
        });
    }

    fn begin_dissolve(&mut self, frame: u64) {
        log::info!(
            "Vine reached {} segments, dissolving",
            self.segments.len()
        );
        self.phase = SimPhase::Dissolving {
            started_frame: frame,
        };
        self.dissolve = Some(Dissolve::new(frame, self.tuning.dissolve_frames));
        self.set_opacity(1.0);
    }

    fn set_opacity(&mut self, opacity: f32) {
        for s in self.segments.iter_mut() {
            s.opacity = opacity;
        }
        for l in self.leaves.iter_mut() {
            l.opacity = opacity;
        }
        for t in self.thorns.iter_mut() {
            t.opacity = opacity;
        }
    }
}

impl Simulation for VineGarden {
    fn phase(&self) -> SimPhase {
        self.phase
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn spawn_step(&mut self, ctx: &TickContext) {
        let leaf_every = self.tuning.leaf_every as u64;
        if leaf_every > 0 && ctx.frame % leaf_every == 0 {
            self.spawn_leaf();
        }
        let thorn_every = self.tuning.thorn_every as u64;
        if thorn_every > 0 && ctx.frame % thorn_every == 0 {
            self.spawn_thorn();
        }
    }

    fn motion_step(&mut self, ctx: &TickContext) {
        self.grow(ctx.pointer_inside);
    }

    fn lifecycle_step(&mut self, ctx: &TickContext) {
        if !self.phase.is_dissolving() && self.segments.len() > self.tuning.max_segments {
            self.begin_dissolve(ctx.frame);
        }

        if let Some(dissolve) = self.dissolve {
            if dissolve.is_complete(ctx.frame) {
                log::info!("Vine reset");
                self.reset();
                return;
            }
            self.set_opacity(dissolve.opacity(ctx.frame));
        }

        for leaf in self.leaves.iter_mut() {
            leaf.step();
        }
        let floor = self.viewport.h() + self.tuning.offscreen_margin;
        self.leaves.retain(|l| l.is_attached() || l.pos.y <= floor);

        if self.leaves.len() > self.tuning.leaf_detach_min_leaves
            && self.rng.chance(self.tuning.leaf_detach_chance)
        {
            if let Some(i) = self.rng.index(self.leaves.len()) {
                self.leaves[i].detach(&mut self.rng);
            }
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        log::info!("Vine resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.reset();
    }

    fn entity_count(&self) -> usize {
        self.segments.len() + self.leaves.len() + self.thorns.len()
    }

    fn pointer_pressed(&mut self, pos: Vec2) {
        let radius = self.tuning.press_radius;
        let max = self.tuning.press_max_detach;
        let mut shaken = 0;
        for leaf in self.leaves.iter_mut() {
            if shaken >= max {
                break;
            }
            if leaf.is_attached() && leaf.pos.distance(pos) < radius {
                leaf.detach(&mut self.rng);
                shaken += 1;
            }
        }
        if shaken > 0 {
            log::debug!("Shook loose {} leaves", shaken);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::{SimClock, TickInput};

    fn garden(tuning: VineTuning) -> VineGarden {
        VineGarden::new(Viewport::new(400, 300), tuning, SimRng::seeded(5))
    }

    fn run(g: &mut VineGarden, clock: &mut SimClock, ticks: usize, input: TickInput) {
        for _ in 0..ticks {
            clock.tick(g, &input);
        }
    }

    #[test]
    fn test_starts_at_left_middle() {
        let g = garden(VineTuning::default());
        assert_eq!(g.segments().len(), 1);
        assert_eq!(g.segments()[0].pos, Vec2::new(0.0, 150.0));
        assert_eq!(g.segments()[0].heading, 0.0);
    }

    #[test]
    fn test_grows_one_segment_per_tick_inside_bounds() {
        let mut g = garden(VineTuning::default());
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 500, TickInput::default());
        assert_eq!(g.segments().len(), 501);
        for s in g.segments() {
            assert!(g.viewport().contains_inclusive(s.pos));
        }
    }

    #[test]
    fn test_hover_speeds_up_growth() {
        let mut g = garden(VineTuning::default());
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 1, TickInput::default());
        assert_eq!(g.speed(), 0.2);
        let hover = TickInput {
            pointer: Some(Vec2::new(200.0, 150.0)),
            now_ms: 0.0,
        };
        run(&mut g, &mut clock, 1, hover);
        assert_eq!(g.speed(), 0.8);
        let segs = g.segments();
        let step = segs[2].pos.distance(segs[1].pos);
        assert!(step <= 4.0 + 1e-4);
    }

    #[test]
    fn test_leaves_wait_for_enough_segments() {
        let tuning = VineTuning {
            leaf_born_falling_chance: 0.0,
            leaf_detach_chance: 0.0,
            ..VineTuning::default()
        };
        let mut g = garden(tuning);
        let mut clock = SimClock::new();
        // Frame 35 has 35 segments before growing (lag 20), so a leaf appears
        run(&mut g, &mut clock, 35, TickInput::default());
        assert_eq!(g.leaves().len(), 1);
        assert!(g.leaves()[0].is_attached());
        // Anchored on segment len - 20 at spawn time
        assert_eq!(g.leaves()[0].pos, g.segments()[15].pos);

        let mut short = garden(VineTuning {
            leaf_every: 5,
            ..VineTuning::default()
        });
        let mut clock = SimClock::new();
        run(&mut short, &mut clock, 15, TickInput::default());
        assert!(short.leaves().is_empty());
    }

    #[test]
    fn test_thorns_need_a_following_segment() {
        let mut g = garden(VineTuning::default());
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 30, TickInput::default());
        assert_eq!(g.thorns().len(), 1);
        let thorn = g.thorns()[0];
        assert!((3.0..5.0).contains(&thorn.length));
    }

    #[test]
    fn test_press_shakes_loose_nearby_leaves() {
        let tuning = VineTuning {
            leaf_every: 1,
            leaf_born_falling_chance: 0.0,
            leaf_detach_chance: 0.0,
            ..VineTuning::default()
        };
        let mut g = garden(tuning);
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 40, TickInput::default());
        let attached_before = g.leaves().iter().filter(|l| l.is_attached()).count();
        assert!(attached_before > 3);

        let near = g.leaves()[0].pos;
        g.pointer_pressed(near);
        let falling = g.leaves().iter().filter(|l| !l.is_attached()).count();
        assert_eq!(falling, 3);
        for l in g.leaves().iter().filter(|l| !l.is_attached()) {
            let speed = l.fall_speed.unwrap();
            assert!((1.0..2.0).contains(&speed));
        }

        g.pointer_pressed(Vec2::new(-500.0, -500.0));
        assert_eq!(g.leaves().iter().filter(|l| !l.is_attached()).count(), 3);
    }

    #[test]
    fn test_fallen_leaves_leave_the_surface() {
        let mut g = garden(VineTuning::default());
        g.leaves.push(Leaf {
            pos: Vec2::new(10.0, 349.5),
            size: 20.0,
            angle: 0.0,
            fall_speed: Some(1.0),
            sway_phase: 0.0,
            sway_speed: 0.01,
            sway_amount: 0.01,
            stem_length: 6.0,
            opacity: 1.0,
        });
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 1, TickInput::default());
        assert!(g.leaves().is_empty());
    }

    #[test]
    fn test_dissolve_same_tick_and_reset_after_duration() {
        let tuning = VineTuning {
            max_segments: 30,
            ..VineTuning::default()
        };
        let mut g = garden(tuning);
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 29, TickInput::default());
        assert_eq!(g.phase(), SimPhase::Running);

        run(&mut g, &mut clock, 1, TickInput::default());
        assert_eq!(g.phase(), SimPhase::Dissolving { started_frame: 30 });
        assert_eq!(g.segments().len(), 31);
        assert_eq!(g.segments()[0].opacity, 1.0);

        run(&mut g, &mut clock, 59, TickInput::default());
        assert!(g.phase().is_dissolving());
        assert_eq!(g.segments().len(), 31);

        run(&mut g, &mut clock, 1, TickInput::default());
        assert_eq!(g.phase(), SimPhase::Running);
        assert_eq!(g.segments().len(), 1);
        assert!(g.leaves().is_empty());
        assert!(g.thorns().is_empty());
    }

    #[test]
    fn test_resize_restarts_at_new_root() {
        let mut g = garden(VineTuning::default());
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 100, TickInput::default());
        g.resize(Viewport::new(200, 80));
        assert_eq!(g.entity_count(), 1);
        assert_eq!(g.segments()[0].pos, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn test_resize_mid_dissolve_restarts() {
        let tuning = VineTuning {
            max_segments: 30,
            ..VineTuning::default()
        };
        let mut g = garden(tuning);
        let mut clock = SimClock::new();
        run(&mut g, &mut clock, 40, TickInput::default());
        assert!(g.phase().is_dissolving());
        assert!(g.segments()[0].opacity < 1.0);

        g.resize(Viewport::new(500, 200));
        assert_eq!(g.phase(), SimPhase::Running);
        assert!(g.dissolve.is_none());
        assert_eq!(g.segments().len(), 1);
        assert_eq!(g.segments()[0].pos, Vec2::new(0.0, 100.0));
        assert!(g.leaves().is_empty());
        assert!(g.thorns().is_empty());

        // Grows again right away instead of finishing the old fade
        run(&mut g, &mut clock, 1, TickInput::default());
        assert_eq!(g.phase(), SimPhase::Running);
        assert_eq!(g.segments().len(), 2);
        assert!(g.segments().iter().all(|s| s.opacity == 1.0));
    }
}
