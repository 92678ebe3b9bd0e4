//! Triangle tessellation for 2D primitives
//!
//! Everything is emitted as a plain triangle list in surface pixels.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Segment count for a circle of the given radius
pub fn circle_segments(radius: f32) -> u32 {
    ((radius * 2.0) as u32).clamp(8, 48)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    if radius <= 0.0 || segments < 3 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::at(center + radius * Vec2::from_angle(theta1), color));
        vertices.push(Vertex::at(center + radius * Vec2::from_angle(theta2), color));
    }

    vertices
}

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    quad(min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max, color)
}

/// Generate vertices for a line segment of the given width
pub fn thick_line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO || width <= 0.0 {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);

    quad(a + perp, a - perp, b + perp, b - perp, color)
}

/// Two triangles: (p0, p1, p2) and (p2, p1, p3)
fn quad(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    [p0, p1, p2, p2, p1, p3]
        .into_iter()
        .map(|p| Vertex::at(p, color))
        .collect()
}

/// Bends sharper than about 3 degrees get a round join
const JOIN_MIN_COS: f32 = 0.9986;

/// Generate vertices for a stroked polyline with round joins
pub fn polyline(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 || width <= 0.0 {
        return Vec::new();
    }
    let radius = width * 0.5;
    let join_segments = circle_segments(radius);
    let mut vertices = Vec::with_capacity(points.len() * (6 + join_segments as usize * 3));

    for pair in points.windows(2) {
        vertices.extend(thick_line(pair[0], pair[1], width, color));
    }
    // Collinear joins are already covered by the two quads; skip them
    for i in 1..points.len() - 1 {
        let incoming = (points[i] - points[i - 1]).normalize_or_zero();
        let outgoing = (points[i + 1] - points[i]).normalize_or_zero();
        if incoming.dot(outgoing) < JOIN_MIN_COS {
            vertices.extend(circle(points[i], radius, color, join_segments));
        }
    }

    vertices
}

/// Generate vertices for a filled polygon as a fan around its first point
pub fn polygon(points: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 3 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity((points.len() - 2) * 3);
    let origin = points[0];
    for pair in points[1..].windows(2) {
        vertices.push(Vertex::at(origin, color));
        vertices.push(Vertex::at(pair[0], color));
        vertices.push(Vertex::at(pair[1], color));
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_circle_triangle_count() {
        assert_eq!(circle(Vec2::ZERO, 5.0, RED, 12).len(), 36);
        assert!(circle(Vec2::ZERO, 0.0, RED, 12).is_empty());
    }

    #[test]
    fn test_thick_line_width() {
        let v = thick_line(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, RED);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [0.0, 2.0]);
        assert_eq!(v[1].position, [0.0, -2.0]);
        assert!(thick_line(Vec2::ONE, Vec2::ONE, 4.0, RED).is_empty());
    }

    #[test]
    fn test_polygon_fan() {
        let square = [
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        assert_eq!(polygon(&square, RED).len(), 6);
        assert!(polygon(&square[..2], RED).is_empty());
    }

    #[test]
    fn test_polyline_needs_two_points() {
        assert!(polyline(&[Vec2::ZERO], 2.0, RED).is_empty());
        let v = polyline(&[Vec2::ZERO, Vec2::new(5.0, 0.0)], 2.0, RED);
        assert_eq!(v.len(), 6);
    }

    #[test]
    fn test_polyline_joins_only_at_bends() {
        let straight = [Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(10.0, 0.0)];
        assert_eq!(polyline(&straight, 2.0, RED).len(), 12);

        let bent = [Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(5.0, 5.0)];
        let join = circle_segments(1.0) as usize * 3;
        assert_eq!(polyline(&bent, 2.0, RED).len(), 12 + join);
    }

    #[test]
    fn test_rect_covers_corners() {
        let v = rect(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), RED);
        assert_eq!(v.len(), 6);
        assert_eq!(v[5].position, [4.0, 6.0]);
    }
}
