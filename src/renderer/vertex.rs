//! Vertex layout shared by the tessellator and the GPU pipeline

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::pipeline::pixel_to_ndc;

/// One triangle corner. Tessellation writes surface pixels; the pipeline
/// converts to clip space with [`Vertex::to_clip`] right before upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    /// Straight (non-premultiplied) RGBA in the target's color space
    pub color: [f32; 4],
}

impl Vertex {
    /// Vertex at a surface pixel
    pub fn at(pos: Vec2, color: [f32; 4]) -> Self {
        Self {
            position: pos.to_array(),
            color,
        }
    }

    pub fn pixel(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    /// Same vertex with its position mapped from pixels to clip space
    pub fn to_clip(self, width: u32, height: u32) -> Self {
        Self {
            position: pixel_to_ndc(self.position, width, height),
            color: self.color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 24);
        assert_eq!(desc.attributes[1].offset, 8);
    }

    #[test]
    fn test_to_clip_keeps_color() {
        let color = [0.2, 0.4, 0.6, 0.5];
        let v = Vertex::at(Vec2::new(100.0, 50.0), color);
        assert_eq!(v.pixel(), Vec2::new(100.0, 50.0));

        let clip = v.to_clip(200, 100);
        assert_eq!(clip.position, [0.0, 0.0]);
        assert_eq!(clip.color, color);
    }
}
