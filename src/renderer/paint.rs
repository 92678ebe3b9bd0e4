//! Render pass: sketch state + palette -> surface calls
//!
//! Nothing here mutates simulation state. Draw order is background, then
//! lines, then filled shapes, then decoration on top.

use glam::{Affine2, Vec2};

use super::surface::Surface;
use crate::color::{Palette, Rgba};
use crate::sim::{BrickField, DotGrid, Simulation, Sketch, VineGarden};

pub const VINE_WIDTH: f32 = 4.5;
pub const STEM_WIDTH: f32 = 1.5;
pub const VEIN_WIDTH: f32 = 0.5;
pub const EDGE_WIDTH: f32 = 1.2;
/// Alpha of dots the pointer is not near
pub const IDLE_DOT_ALPHA: f32 = 150.0;
/// Bevel thickness on brick edges
pub const BEVEL: f32 = 2.0;
pub const BRICK_HIGHLIGHT: Rgba = Rgba::new(50, 50, 50, 128);
pub const BRICK_SHADOW: Rgba = Rgba::new(0, 0, 0, 204);

/// Points per flattened bézier curve
const CURVE_STEPS: usize = 8;

/// Draw one frame of `sketch`
pub fn paint(sketch: &Sketch, palette: &Palette, surface: &mut dyn Surface) {
    surface.clear(palette.background);
    match sketch {
        Sketch::Bricks(field) => paint_bricks(field, palette, surface),
        Sketch::Vine(vine) => paint_vine(vine, palette, surface),
        Sketch::Grid(grid) => paint_grid(grid, palette, surface),
    }
}

fn paint_bricks(field: &BrickField, palette: &Palette, surface: &mut dyn Surface) {
    for brick in field.bricks() {
        let min = brick.pos.floor();
        let size = brick.size;
        let fade = brick.opacity;

        surface.fill_rect(min, size, palette.text.faded(fade));

        let highlight = BRICK_HIGHLIGHT.faded(fade);
        surface.fill_rect(min, Vec2::new(size.x, BEVEL), highlight);
        surface.fill_rect(min, Vec2::new(BEVEL, size.y), highlight);

        let shadow = BRICK_SHADOW.faded(fade);
        surface.fill_rect(
            Vec2::new(min.x, (brick.pos.y + size.y - BEVEL).floor()),
            Vec2::new(size.x, BEVEL),
            shadow,
        );
        surface.fill_rect(
            Vec2::new((brick.pos.x + size.x - BEVEL).floor(), min.y),
            Vec2::new(BEVEL, size.y),
            shadow,
        );
    }

    for p in field.particles() {
        surface.fill_rect(
            p.pos.floor(),
            Vec2::splat(p.size),
            palette.text.with_alpha(p.opacity),
        );
    }
}

fn paint_vine(vine: &VineGarden, palette: &Palette, surface: &mut dyn Surface) {
    let dissolving = vine.phase().is_dissolving();

    if let Some(first) = vine.segments().first() {
        let points: Vec<Vec2> = vine.segments().iter().map(|s| s.pos).collect();
        surface.polyline(&points, VINE_WIDTH, palette.accent.faded(first.opacity));
    }

    for thorn in vine.thorns() {
        let xf = Affine2::from_angle_translation(thorn.angle, thorn.pos);
        let tri = [
            xf.transform_point2(Vec2::new(-1.0, -1.5)),
            xf.transform_point2(Vec2::new(thorn.length, 0.0)),
            xf.transform_point2(Vec2::new(-1.0, 1.5)),
        ];
        surface.fill_polygon(&tri, palette.accent.faded(thorn.opacity));
    }

    for leaf in vine.leaves() {
        let (body, vein) = if dissolving {
            let c = palette.accent.faded(leaf.opacity);
            (c, c)
        } else {
            (palette.text, palette.text)
        };

        let base = Affine2::from_angle_translation(leaf.angle, leaf.pos);
        let stem_tip = Vec2::new(0.0, -leaf.stem_length);
        surface.line(
            base.transform_point2(Vec2::ZERO),
            base.transform_point2(stem_tip),
            STEM_WIDTH,
            body,
        );

        let blade = base * Affine2::from_translation(stem_tip);
        let outline: Vec<Vec2> = leaf_outline(leaf.size)
            .into_iter()
            .map(|p| blade.transform_point2(p))
            .collect();
        surface.fill_polygon(&outline, body);
        surface.line(
            blade.transform_point2(Vec2::ZERO),
            blade.transform_point2(Vec2::new(0.0, -leaf.size * 0.9)),
            VEIN_WIDTH,
            vein,
        );
    }
}

fn paint_grid(grid: &DotGrid, palette: &Palette, surface: &mut dyn Surface) {
    let dots = grid.dots();
    for edge in grid.edges() {
        let (Some(a), Some(b)) = (dots.get(edge.start), dots.get(edge.end)) else {
            continue;
        };
        surface.line(a.pos, b.pos, EDGE_WIDTH, palette.accent.faded(edge.opacity));
    }

    for dot in dots {
        let color = if dot.active {
            palette.accent
        } else {
            palette.accent.with_alpha(IDLE_DOT_ALPHA)
        };
        surface.fill_circle(dot.pos, dot.size / 2.0, color);
    }
}

/// Leaf blade in local space: stem at the origin, tip at `(0, -size)`
pub fn leaf_outline(size: f32) -> Vec<Vec2> {
    let half = size * 0.5;
    let h = size;
    let mut points = Vec::with_capacity(2 * CURVE_STEPS + 2);

    points.push(Vec2::ZERO);
    flatten_cubic(
        &mut points,
        [
            Vec2::ZERO,
            Vec2::new(-half * 0.7, -h * 0.3),
            Vec2::new(-half, -h * 0.5),
            Vec2::new(-half * 0.6, -h * 0.8),
        ],
    );
    let tip = Vec2::new(0.0, -h);
    points.push(tip);
    flatten_cubic(
        &mut points,
        [
            tip,
            Vec2::new(half * 0.6, -h * 0.8),
            Vec2::new(half, -h * 0.5),
            Vec2::new(half * 0.7, -h * 0.3),
        ],
    );
    points
}

/// Append points along a cubic bézier, excluding its start point
fn flatten_cubic(out: &mut Vec<Vec2>, [p0, p1, p2, p3]: [Vec2; 4]) {
    for i in 1..=CURVE_STEPS {
        let t = i as f32 / CURVE_STEPS as f32;
        let u = 1.0 - t;
        out.push(
            p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t),
        );
    }
}
