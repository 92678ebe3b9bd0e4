//! Host-facing engine
//!
//! One [`Engine`] drives one sketch on one canvas. The host calls the
//! lifecycle hooks from its event handlers and [`Engine::frame`] from its
//! animation callback; everything else happens inside.

use std::collections::HashMap;

use glam::Vec2;

use crate::color::Palette;
use crate::renderer::{Surface, paint};
use crate::settings::Settings;
use crate::sim::{SimClock, SimRng, Simulation, Sketch, TickContext, TickInput, Viewport};

pub use crate::sim::SketchKind;

/// What the engine needs from its host environment
pub trait Host {
    /// Raw value of a theme token (`accent`, `background`, `text`)
    fn color_token(&self, name: &str) -> Option<String>;

    /// Current surface size, if the host has one
    fn surface_size(&self) -> Option<(u32, u32)>;

    /// Monotonic clock in milliseconds
    fn now_ms(&self) -> f64;
}

/// Host with fixed values, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    pub size: Option<(u32, u32)>,
    pub tokens: HashMap<String, String>,
    pub now_ms: f64,
}

impl StaticHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, name: &str, value: &str) -> Self {
        self.tokens.insert(name.to_string(), value.to_string());
        self
    }
}

impl Host for StaticHost {
    fn color_token(&self, name: &str) -> Option<String> {
        self.tokens.get(name).cloned()
    }

    fn surface_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// Runs one sketch
#[derive(Debug, Clone)]
pub struct Engine {
    kind: SketchKind,
    settings: Settings,
    seed: Option<u64>,
    sketch: Option<Sketch>,
    clock: SimClock,
    /// Latest pointer position; last write wins
    pointer: Option<Vec2>,
    palette: Palette,
    running: bool,
}

impl Engine {
    pub fn new(kind: SketchKind, settings: Settings) -> Self {
        Self {
            kind,
            settings,
            seed: None,
            sketch: None,
            clock: SimClock::new(),
            pointer: None,
            palette: Palette::default(),
            running: false,
        }
    }

    /// Use a fixed RNG seed instead of entropy
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn kind(&self) -> SketchKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sketch(&self) -> Option<&Sketch> {
        self.sketch.as_ref()
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame
    }

    fn rng(&self) -> SimRng {
        match self.seed {
            Some(seed) => SimRng::seeded(seed),
            None => SimRng::from_entropy(),
        }
    }

    /// Build the sketch for the given surface size (400x400 when unknown)
    pub fn start(&mut self, size: Option<(u32, u32)>) {
        let viewport = Viewport::from_host(size);
        let rng = self.rng();
        log::info!(
            "Starting {} sketch at {}x{} (seed {})",
            self.kind.as_str(),
            viewport.width,
            viewport.height,
            rng.seed()
        );
        self.sketch = Some(Sketch::new(self.kind, viewport, &self.settings, rng));
        self.clock = SimClock::new();
        self.pointer = None;
        self.running = true;
    }

    /// Discard state and rebuild for a new surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.running {
            return;
        }
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.as_sim_mut().resize(Viewport::new(width, height));
        }
        self.clock.reset();
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
    }

    /// Pointer left the surface; no dot is nearest until it comes back
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn pointer_pressed(&mut self, x: f32, y: f32) {
        let pos = Vec2::new(x, y);
        self.pointer = Some(pos);
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.as_sim_mut().pointer_pressed(pos);
        }
    }

    pub fn pointer_dragged(&mut self, x: f32, y: f32) {
        let pos = Vec2::new(x, y);
        self.pointer = Some(pos);
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.as_sim_mut().pointer_dragged(pos);
        }
    }

    pub fn pointer_released(&mut self) {
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.as_sim_mut().pointer_released();
        }
    }

    /// Advance the simulation one tick without drawing
    pub fn step(&mut self, now_ms: f64) -> Option<TickContext> {
        if !self.running {
            return None;
        }
        let sketch = self.sketch.as_mut()?;
        let input = TickInput {
            pointer: self.pointer,
            now_ms,
        };
        Some(self.clock.tick(sketch.as_sim_mut(), &input))
    }

    /// One animation frame: theme refresh, tick, paint
    pub fn frame(&mut self, host: &dyn Host, surface: &mut dyn Surface) -> Option<TickContext> {
        if !self.running {
            return None;
        }
        self.palette = Palette::resolve(|name| host.color_token(name));
        let ctx = self.step(host.now_ms())?;
        if let Some(sketch) = self.sketch.as_ref() {
            paint(sketch, &self.palette, surface);
        }
        Some(ctx)
    }

    /// Page is going away; a page kept in the back-forward cache resumes
    /// as it was, anything else is disposed
    pub fn page_hidden(&mut self, persisted: bool) {
        if persisted {
            log::debug!("Page cached, keeping {} sketch", self.kind.as_str());
            return;
        }
        self.dispose();
    }

    /// Stop for good and drop all entities
    pub fn dispose(&mut self) {
        if self.running {
            log::info!("Disposing {} sketch", self.kind.as_str());
        }
        self.running = false;
        self.sketch = None;
        self.pointer = None;
    }
}
