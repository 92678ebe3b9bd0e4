//! End-to-end scenarios for each sketch

use canvas_sketches::engine::StaticHost;
use canvas_sketches::renderer::{DrawCommand, RecordingSurface};
use canvas_sketches::settings::{Settings, VineTuning};
use canvas_sketches::sim::{
    BrickField, DotGrid, SimClock, SimPhase, SimRng, Simulation, Sketch, TickInput, Viewport,
    VineGarden,
};
use canvas_sketches::{Engine, SketchKind};
use glam::Vec2;

#[test]
fn test_first_brick_lands_on_floor_alone() {
    let settings = Settings::default();
    let mut field = BrickField::new(
        Viewport::new(400, 400),
        settings.bricks.clone(),
        settings.max_particles(),
        SimRng::seeded(2024),
    );
    let mut clock = SimClock::new();

    let mut landed_at = None;
    for _ in 0..1000 {
        let ctx = clock.tick(&mut field, &TickInput::default());
        let landed: Vec<_> = field.bricks().iter().filter(|b| b.landed).collect();
        if !landed.is_empty() {
            assert_eq!(landed.len(), 1);
            assert_eq!(landed[0].id, field.bricks()[0].id);
            assert_eq!(landed[0].pos.y, 400.0 - 5.0 - 30.0);
            landed_at = Some(ctx.frame);
            break;
        }
    }

    let frame = landed_at.expect("first brick never landed");
    // Lands after the second brick has already been spawned
    assert!(frame > 120);
    assert!(field.bricks().len() >= 2);
}

#[test]
fn test_grid_trace_between_two_dots() {
    let settings = Settings::default();
    let mut grid = DotGrid::new(Viewport::new(400, 400), settings.grid.clone());
    let mut clock = SimClock::new();

    let a = grid.dots()[10].pos;
    let b = grid.dots()[18].pos;

    clock.tick(
        &mut grid,
        &TickInput {
            pointer: Some(a + Vec2::new(2.0, -1.0)),
            now_ms: 1_000.0,
        },
    );
    clock.tick(
        &mut grid,
        &TickInput {
            pointer: Some(b + Vec2::new(-1.0, 1.0)),
            now_ms: 1_016.0,
        },
    );

    assert_eq!(grid.edges().len(), 1);
    let edge = grid.edges()[0];
    assert_eq!((edge.start, edge.end), (10, 18));
    assert_eq!(edge.opacity, 1.0);
}

#[test]
fn test_vine_dissolves_past_maximum_and_resets() {
    let tuning = VineTuning::default();
    let max = tuning.max_segments;
    let dissolve_frames = tuning.dissolve_frames as u64;
    let mut vine = VineGarden::new(Viewport::new(600, 400), tuning, SimRng::seeded(77));
    let mut clock = SimClock::new();

    let mut dissolve_started = None;
    for _ in 0..max + 10 {
        let ctx = clock.tick(&mut vine, &TickInput::default());
        if vine.segments().len() > max {
            assert_eq!(
                vine.phase(),
                SimPhase::Dissolving {
                    started_frame: ctx.frame
                }
            );
            dissolve_started = Some(ctx.frame);
            break;
        }
        assert_eq!(vine.phase(), SimPhase::Running);
    }
    let started = dissolve_started.expect("vine never reached its maximum");

    loop {
        let ctx = clock.tick(&mut vine, &TickInput::default());
        if vine.phase() == SimPhase::Running {
            assert_eq!(ctx.frame - started, dissolve_frames);
            break;
        }
        assert!(ctx.frame - started < dissolve_frames);
    }
    assert_eq!(vine.segments().len(), 1);
    assert_eq!(vine.segments()[0].pos, Vec2::new(0.0, 200.0));
}

#[test]
fn test_resize_keeps_entities_in_bounds() {
    let settings = Settings::default();
    for kind in SketchKind::ALL {
        let mut sketch = Sketch::new(kind, Viewport::new(800, 600), &settings, SimRng::seeded(5));
        let mut clock = SimClock::new();
        for i in 0..500 {
            let input = TickInput {
                pointer: Some(Vec2::new(i as f32, 300.0)),
                now_ms: i as f64 * 16.0,
            };
            clock.tick(sketch.as_sim_mut(), &input);
        }

        sketch.as_sim_mut().resize(Viewport::new(320, 240));
        let bounds = Viewport::new(320, 240);
        for pos in sketch.positions() {
            assert!(bounds.contains_inclusive(pos), "{:?} {:?}", kind, pos);
        }
    }
}

#[test]
fn test_engine_frames_until_disposed() {
    let host = StaticHost::new(300, 300)
        .with_token("accent", "rgb(255, 0, 128)")
        .with_token("background", "#000");
    let mut surface = RecordingSurface::new(300, 300);
    let mut engine = Engine::new(SketchKind::Grid, Settings::default()).with_seed(1);
    engine.start(host.size);

    engine.pointer_moved(150.0, 150.0);
    assert!(engine.frame(&host, &mut surface).is_some());
    let circles = surface.count(|c| matches!(c, DrawCommand::Circle { .. }));
    assert_eq!(circles, 96);
    // Exactly one dot is lit at full accent
    let lit = surface.count(|c| {
        matches!(c, DrawCommand::Circle { color, .. } if color.a == 255)
    });
    assert_eq!(lit, 1);

    engine.dispose();
    assert!(!engine.is_running());
    assert!(engine.frame(&host, &mut surface).is_none());
}
