//! Axis-aligned collision for falling bricks
//!
//! A falling brick is tested against the floor line and the top faces of
//! bricks that have already landed. When more than one surface qualifies in
//! the same frame the brick rests on the highest one (smallest y), which is
//! the surface it would physically meet first. Equal heights keep the
//! earliest candidate in iteration order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Closed containment test (edges are hits)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Open overlap of horizontal extents (touching edges do not overlap)
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }
}

/// What a brick came to rest on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Support {
    Floor,
    /// Index of the supporting brick in the caller's collection
    Brick(usize),
}

/// Result of a landing check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Top edge the brick snaps to
    pub rest_y: f32,
    pub support: Support,
}

/// Check whether a brick moving to `projected_y` meets the floor or a landed
/// brick this frame
///
/// `landed` yields the index and bounds of every landed brick other than the
/// falling one.
pub fn find_landing<I>(falling: &Rect, projected_y: f32, floor_y: f32, landed: I) -> Option<Landing>
where
    I: IntoIterator<Item = (usize, Rect)>,
{
    let height = falling.size.y;
    let projected_bottom = projected_y + height;

    let mut best: Option<Landing> = None;
    let mut consider = |candidate: Landing| {
        if best.is_none_or(|b| candidate.rest_y < b.rest_y) {
            best = Some(candidate);
        }
    };

    for (index, other) in landed {
        let meets_top = projected_bottom >= other.top() && projected_y < other.top();
        if meets_top && falling.overlaps_x(&other) {
            consider(Landing {
                rest_y: other.top() - height,
                support: Support::Brick(index),
            });
        }
    }

    if projected_bottom >= floor_y {
        consider(Landing {
            rest_y: floor_y - height,
            support: Support::Floor,
        });
    }

    best
}
