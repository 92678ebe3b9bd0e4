//! Drawing surface dimensions as seen by the simulations

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_SURFACE_SIZE;

/// Pixel size of the surface a simulation lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(FALLBACK_SURFACE_SIZE.0, FALLBACK_SURFACE_SIZE.1)
    }
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Use the host-reported size, or the fallback size when the host has no
    /// surface yet
    pub fn from_host(size: Option<(u32, u32)>) -> Self {
        match size {
            Some((width, height)) => Self::new(width, height),
            None => {
                log::warn!(
                    "No surface size available, falling back to {}x{}",
                    FALLBACK_SURFACE_SIZE.0,
                    FALLBACK_SURFACE_SIZE.1
                );
                Self::default()
            }
        }
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.width as f32
    }

    #[inline]
    pub fn h(&self) -> f32 {
        self.height as f32
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w(), self.h())
    }

    #[inline]
    pub fn min_side(&self) -> f32 {
        self.w().min(self.h())
    }

    /// Strictly inside the surface (edges count as outside)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > 0.0 && p.x < self.w() && p.y > 0.0 && p.y < self.h()
    }

    /// Inside the closed rectangle `[0, w] x [0, h]`
    pub fn contains_inclusive(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.w() && p.y >= 0.0 && p.y <= self.h()
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(Vec2::ZERO, self.size())
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
