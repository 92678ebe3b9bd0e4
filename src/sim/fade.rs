//! Opacity decay helpers
//!
//! Two kinds of decay are used by the sketches:
//! - timed fades, where an entity's opacity falls linearly with its age and
//!   the entity is removed once fully transparent (trace lines)
//! - dissolves, where every live entity fades together over a fixed number
//!   of frames before the whole simulation resets (bricks, vine)

use serde::{Deserialize, Serialize};

use crate::{finite_or, map_range};

/// Opacity (1 = opaque, 0 = gone) of something `age` into a `duration` fade
///
/// Degenerate durations (zero, negative, NaN) count as already expired.
pub fn timed_opacity(age: f64, duration: f64) -> f32 {
    if !(duration > 0.0) || !age.is_finite() {
        return 0.0;
    }
    let t = (age / duration) as f32;
    finite_or(map_range(t, 0.0, 1.0, 1.0, 0.0), 0.0).clamp(0.0, 1.0)
}

/// Timed entities are kept while strictly younger than their fade duration
#[inline]
pub fn is_expired(age: f64, duration: f64) -> bool {
    !(age < duration)
}

/// A frame-counted fade of an entire simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dissolve {
    pub started_frame: u64,
    pub duration_frames: u32,
}

impl Dissolve {
    pub fn new(started_frame: u64, duration_frames: u32) -> Self {
        Self {
            started_frame,
            duration_frames,
        }
    }

    /// Fraction complete at `frame`, in [0, 1]
    pub fn progress(&self, frame: u64) -> f32 {
        if self.duration_frames == 0 {
            return 1.0;
        }
        let elapsed = frame.saturating_sub(self.started_frame) as f32;
        (elapsed / self.duration_frames as f32).clamp(0.0, 1.0)
    }

    /// Opacity every dissolving entity is driven to at `frame`
    pub fn opacity(&self, frame: u64) -> f32 {
        1.0 - self.progress(frame)
    }

    pub fn is_complete(&self, frame: u64) -> bool {
        self.progress(frame) >= 1.0
    }
}
