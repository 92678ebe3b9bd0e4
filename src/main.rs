//! Canvas Sketches entry point
//!
//! On the web, attaches one engine to each sketch canvas found on the page
//! and drives it from `requestAnimationFrame`. Natively, runs a headless demo
//! of each sketch and prints a JSON summary.

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PageTransitionEvent, PointerEvent};

    use canvas_sketches::renderer::{MeshSurface, RenderState};
    use canvas_sketches::{Engine, Host, Settings, SketchKind};

    /// Reads theme tokens from CSS custom properties on `<html>`
    struct BrowserHost {
        canvas: HtmlCanvasElement,
    }

    impl Host for BrowserHost {
        fn color_token(&self, name: &str) -> Option<String> {
            let window = web_sys::window()?;
            let root = window.document()?.document_element()?;
            let style = window.get_computed_style(&root).ok()??;
            let value = style
                .get_property_value(&format!("--color-{}", name))
                .ok()?;
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }

        fn surface_size(&self) -> Option<(u32, u32)> {
            let w = self.canvas.client_width();
            let h = self.canvas.client_height();
            if w > 0 && h > 0 {
                Some((w as u32, h as u32))
            } else {
                None
            }
        }

        fn now_ms(&self) -> f64 {
            web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or_else(js_sys::Date::now)
        }
    }

    /// One canvas with its engine and GPU state
    struct SketchCanvas {
        engine: Engine,
        host: BrowserHost,
        render_state: Option<RenderState>,
        mesh: MeshSurface,
        dragging: bool,
    }

    impl SketchCanvas {
        fn frame(&mut self) {
            if self.engine.frame(&self.host, &mut self.mesh).is_none() {
                return;
            }
            if let Some(rs) = self.render_state.as_mut() {
                match rs.render(&self.mesh) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        rs.reconfigure();
                    }
                    Err(e) => log::warn!("Frame skipped: {:?}", e),
                }
            }
        }

        fn resize(&mut self) {
            let Some((w, h)) = self.host.surface_size() else {
                return;
            };
            self.host.canvas.set_width(w);
            self.host.canvas.set_height(h);
            if let Some(rs) = self.render_state.as_mut() {
                rs.resize(w, h);
            }
            self.mesh.resize(w, h);
            self.engine.resize(w, h);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Canvas sketches starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let settings = Settings::load();

        for kind in SketchKind::ALL {
            let Some(element) = document.get_element_by_id(kind.canvas_id()) else {
                log::debug!("No #{} on this page", kind.canvas_id());
                continue;
            };
            let Ok(canvas) = element.dyn_into::<HtmlCanvasElement>() else {
                log::warn!("#{} is not a canvas", kind.canvas_id());
                continue;
            };
            wasm_bindgen_futures::spawn_local(start_canvas(kind, canvas, settings.clone()));
        }
    }

    async fn start_canvas(kind: SketchKind, canvas: HtmlCanvasElement, settings: Settings) {
        let host = BrowserHost {
            canvas: canvas.clone(),
        };
        let size = host.surface_size();
        let (width, height) = size.unwrap_or(canvas_sketches::consts::FALLBACK_SURFACE_SIZE);
        canvas.set_width(width);
        canvas.set_height(height);

        let mut engine = Engine::new(kind, settings);
        engine.start(size);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let render_state = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(rs) => Some(rs),
                            Err(e) => {
                                log::error!("{}: {}", kind.canvas_id(), e);
                                None
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("{}: no adapter: {}", kind.canvas_id(), e);
                        None
                    }
                }
            }
            Err(e) => {
                log::error!("{}: surface creation failed: {}", kind.canvas_id(), e);
                None
            }
        };

        let linear = render_state.as_ref().is_some_and(|rs| rs.is_srgb());
        let sketch = Rc::new(RefCell::new(SketchCanvas {
            engine,
            host,
            render_state,
            mesh: MeshSurface::new(width, height, linear),
            dragging: false,
        }));

        setup_input_handlers(&canvas, sketch.clone());
        setup_lifecycle_handlers(sketch.clone());

        request_animation_frame(sketch);
        log::info!("#{} running", kind.canvas_id());
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, sketch: Rc<RefCell<SketchCanvas>>) {
        // Move (drag while a button is held)
        {
            let sketch = sketch.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut s = sketch.borrow_mut();
                let (x, y) = (event.offset_x() as f32, event.offset_y() as f32);
                if s.dragging {
                    s.engine.pointer_dragged(x, y);
                } else {
                    s.engine.pointer_moved(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Press
        {
            let sketch = sketch.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                let mut s = sketch.borrow_mut();
                s.dragging = true;
                s.engine
                    .pointer_pressed(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release / cancel
        for name in ["pointerup", "pointercancel"] {
            let sketch = sketch.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let mut s = sketch.borrow_mut();
                s.dragging = false;
                s.engine.pointer_released();
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Leaving the canvas clears the pointer
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let mut s = sketch.borrow_mut();
                if !s.dragging {
                    s.engine.pointer_left();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle_handlers(sketch: Rc<RefCell<SketchCanvas>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let sketch = sketch.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                sketch.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // A page kept in the back-forward cache resumes as it was
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                sketch.borrow_mut().engine.page_hidden(event.persisted());
            });
            let _ =
                window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(sketch: Rc<RefCell<SketchCanvas>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            frame_loop(sketch);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(sketch: Rc<RefCell<SketchCanvas>>) {
        {
            let mut s = sketch.borrow_mut();
            if !s.engine.is_running() {
                log::info!("#{} stopped", s.engine.kind().canvas_id());
                return;
            }
            s.frame();
        }

        request_animation_frame(sketch);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_host::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Canvas sketches (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the interactive version");

    let args = cli::Args::parse();
    let summaries: Vec<demo::DemoSummary> = args
        .sketch
        .kinds()
        .into_iter()
        .map(|kind| demo::run(kind, args.ticks, args.seed))
        .collect();

    match serde_json::to_string_pretty(&summaries) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not encode summary: {}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::{Parser, ValueEnum};

    use canvas_sketches::SketchKind;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Headless run of the canvas sketches", long_about = None)]
    pub struct Args {
        /// Sketch to run
        #[arg(value_enum, default_value_t = SketchArg::All)]
        pub sketch: SketchArg,

        /// Frames to simulate
        #[arg(default_value_t = 900)]
        pub ticks: u64,

        /// RNG seed
        #[arg(default_value_t = 42)]
        pub seed: u64,
    }

    #[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
    pub enum SketchArg {
        #[value(alias = "brick")]
        Bricks,
        #[value(alias = "growing")]
        Vine,
        #[value(alias = "dots", alias = "connecting")]
        Grid,
        All,
    }

    impl SketchArg {
        pub fn kinds(self) -> Vec<SketchKind> {
            match self {
                SketchArg::Bricks => vec![SketchKind::Bricks],
                SketchArg::Vine => vec![SketchKind::Vine],
                SketchArg::Grid => vec![SketchKind::Grid],
                SketchArg::All => SketchKind::ALL.to_vec(),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let args = Args::try_parse_from(["canvas-sketches"]).unwrap();
            assert_eq!(args.sketch, SketchArg::All);
            assert_eq!((args.ticks, args.seed), (900, 42));
            assert_eq!(args.sketch.kinds(), SketchKind::ALL.to_vec());
        }

        #[test]
        fn test_positional_args() {
            let args = Args::try_parse_from(["canvas-sketches", "connecting", "120", "7"]).unwrap();
            assert_eq!(args.sketch.kinds(), vec![SketchKind::Grid]);
            assert_eq!((args.ticks, args.seed), (120, 7));
        }

        #[test]
        fn test_rejects_bad_input() {
            assert!(Args::try_parse_from(["canvas-sketches", "vine", "9x9"]).is_err());
            assert!(Args::try_parse_from(["canvas-sketches", "tetris"]).is_err());
        }
    }
}

/// Headless run with a scripted pointer
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use serde::Serialize;

    use canvas_sketches::engine::StaticHost;
    use canvas_sketches::renderer::MeshSurface;
    use canvas_sketches::sim::{Simulation, Sketch};
    use canvas_sketches::{Engine, Settings, SketchKind};

    const WIDTH: u32 = 400;
    const HEIGHT: u32 = 400;
    /// Host frame interval at 60 Hz
    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Debug, Serialize)]
    pub struct DemoSummary {
        pub sketch: &'static str,
        pub ticks: u64,
        pub seed: u64,
        pub final_entities: usize,
        pub peak_entities: usize,
        pub peak_vertices: usize,
        pub dissolves: u32,
        pub detail: serde_json::Value,
    }

    pub fn run(kind: SketchKind, ticks: u64, seed: u64) -> DemoSummary {
        let mut engine = Engine::new(kind, Settings::load()).with_seed(seed);
        let mut host = StaticHost::new(WIDTH, HEIGHT);
        let mut mesh = MeshSurface::new(WIDTH, HEIGHT, false);
        engine.start(Some((WIDTH, HEIGHT)));

        let mut peak_entities = 0;
        let mut peak_vertices = 0;
        let mut dissolves = 0;
        let mut was_dissolving = false;

        for tick in 0..ticks {
            host.now_ms = tick as f64 * FRAME_MS;

            // Slow figure-eight across the surface
            let t = tick as f32 * 0.01;
            let x = WIDTH as f32 * (0.5 + 0.4 * t.sin());
            let y = HEIGHT as f32 * (0.5 + 0.4 * (2.0 * t).sin());
            engine.pointer_moved(x, y);
            if tick % 300 == 150 {
                engine.pointer_pressed(x, y);
                engine.pointer_released();
            }

            if engine.frame(&host, &mut mesh).is_none() {
                break;
            }

            if let Some(sketch) = engine.sketch() {
                let sim = sketch.as_sim();
                peak_entities = peak_entities.max(sim.entity_count());
                let dissolving = sim.phase().is_dissolving();
                if dissolving && !was_dissolving {
                    dissolves += 1;
                }
                was_dissolving = dissolving;
            }
            peak_vertices = peak_vertices.max(mesh.vertices().len());
        }

        let (final_entities, detail) = match engine.sketch() {
            Some(sketch) => (sketch.as_sim().entity_count(), detail(sketch)),
            None => (0, serde_json::Value::Null),
        };
        log::info!(
            "{}: {} ticks, peak {} entities, {} dissolves",
            kind.as_str(),
            ticks,
            peak_entities,
            dissolves
        );
        engine.dispose();

        DemoSummary {
            sketch: kind.as_str(),
            ticks,
            seed,
            final_entities,
            peak_entities,
            peak_vertices,
            dissolves,
            detail,
        }
    }

    fn detail(sketch: &Sketch) -> serde_json::Value {
        match sketch {
            Sketch::Bricks(f) => serde_json::json!({
                "bricks": f.bricks().len(),
                "landed": f.bricks().iter().filter(|b| b.landed).count(),
                "particles": f.particles().len(),
            }),
            Sketch::Vine(v) => serde_json::json!({
                "segments": v.segments().len(),
                "leaves": v.leaves().len(),
                "falling_leaves": v.leaves().iter().filter(|l| !l.is_attached()).count(),
                "thorns": v.thorns().len(),
            }),
            Sketch::Grid(g) => serde_json::json!({
                "dots": g.dots().len(),
                "edges": g.edges().len(),
                "active": g.last_active(),
            }),
        }
    }
}
