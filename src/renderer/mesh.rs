//! Surface that tessellates draw calls into a vertex list for the GPU

use glam::Vec2;

use super::shapes;
use super::surface::Surface;
use super::vertex::Vertex;
use crate::color::Rgba;

/// Collects one frame of triangles
#[derive(Debug, Clone)]
pub struct MeshSurface {
    width: u32,
    height: u32,
    /// Convert colors to linear light (sRGB render target)
    linear: bool,
    background: Rgba,
    vertices: Vec<Vertex>,
}

impl MeshSurface {
    pub fn new(width: u32, height: u32, linear: bool) -> Self {
        Self {
            width,
            height,
            linear,
            background: Rgba::WHITE,
            vertices: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Color the frame was cleared to, in the target's color space
    pub fn clear_color(&self) -> [f32; 4] {
        self.convert(self.background)
    }

    fn convert(&self, color: Rgba) -> [f32; 4] {
        if self.linear {
            color.to_linear()
        } else {
            color.to_f32()
        }
    }
}

impl Surface for MeshSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        self.background = color;
        self.vertices.clear();
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let c = self.convert(color);
        self.vertices.extend(shapes::rect(min, size, c));
    }

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let c = self.convert(color);
        self.vertices.extend(shapes::thick_line(a, b, width, c));
    }

    fn polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let c = self.convert(color);
        self.vertices.extend(shapes::polyline(points, width, c));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let c = self.convert(color);
        self.vertices
            .extend(shapes::circle(center, radius, c, shapes::circle_segments(radius)));
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if color.a == 0 {
            return;
        }
        let c = self.convert(color);
        self.vertices.extend(shapes::polygon(points, c));
    }
}
