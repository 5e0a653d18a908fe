//! Pinch gesture to grid-column mapping.
//!
//! A pinch arrives as a stream of incremental zoom factors (>1 spreading,
//! <1 pinching). The mapper accumulates them into a running scale and maps
//! that scale to a column count: spreading zooms in (fewer, larger cells),
//! pinching zooms out (more, smaller cells).
//!
//! The accumulated scale resets whenever a column change is committed, so
//! each step of a continuous gesture requires the same finger travel as the
//! last. Without the reset, a long pinch would accelerate through the column
//! range.

/// Maps accumulated pinch scale to grid column counts.
#[derive(Debug, Clone)]
pub struct PinchMapper {
    min_columns: u32,
    max_columns: u32,
    scale: f32,
}

impl PinchMapper {
    pub fn new(min_columns: u32, max_columns: u32) -> Self {
        Self {
            min_columns,
            max_columns,
            scale: 1.0,
        }
    }

    /// Feed one incremental zoom factor.
    ///
    /// Returns `Some(new_columns)` when the accumulated scale crosses into
    /// a different column count, `None` while the gesture is still within
    /// the current one. A commit resets the accumulated scale.
    pub fn apply(&mut self, current_columns: u32, zoom_change: f32) -> Option<u32> {
        if !(zoom_change.is_finite() && zoom_change > 0.0) {
            return None;
        }
        self.scale *= zoom_change;

        let candidate = (current_columns as f32 / self.scale)
            .round()
            .clamp(self.min_columns as f32, self.max_columns as f32) as u32;

        if candidate != current_columns {
            self.scale = 1.0;
            Some(candidate)
        } else {
            None
        }
    }

    /// The gesture ended (fingers lifted). Discards accumulated scale so the
    /// next gesture starts fresh.
    pub fn end(&mut self) {
        self.scale = 1.0;
    }
}
