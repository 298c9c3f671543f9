//! Stick vector sampling (radial clamp, dead zone, direction classification)
//!
//! Pure geometry: given a pointer position and the live geometry of a
//! circular control, produce the clamped visual offset of the stick handle
//! and the symbolic direction the displacement means. No state, no side
//! effects; every caller gets the same answer for the same inputs.

use super::{Direction, Vec2};

/// Live geometry of a circular stick control.
///
/// `center` is the control's center in viewport coordinates and may move
/// between samples (the widget is laid out by an external surface);
/// `radius` caps the handle travel; displacements within `dead_zone` of the
/// center classify as neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickGeometry {
    pub center: Vec2,
    pub radius: f64,
    pub dead_zone: f64,
}

impl StickGeometry {
    pub fn new(center: Vec2, radius: f64, dead_zone: f64) -> Self {
        Self {
            center,
            radius,
            dead_zone,
        }
    }
}

/// One processed pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickSample {
    /// Handle offset from the control center, clamped to the control
    /// radius with its angle preserved.
    pub offset: Vec2,
    /// Symbolic direction of the displacement, `None` within the dead zone.
    pub direction: Option<Direction>,
}

/// Sample a pointer position against a stick control.
///
/// The displacement is the pointer position minus the control center. If
/// its length exceeds the control radius it is rescaled to exactly the
/// radius (direction preserved, magnitude capped) - that rescaled vector is
/// the visual offset. Classification uses the raw (pre-clamp) distance for
/// the dead-zone check, then compares `|dx|` against `|dy|`: the larger
/// axis wins, with ties going to the X axis.
///
/// # Example
/// ```
/// use quadbot_gw::control::{sample, Direction, StickGeometry, Vec2};
///
/// let geom = StickGeometry::new(Vec2::ZERO, 50.0, 10.0);
/// let s = sample(Vec2::new(100.0, 0.0), &geom);
/// assert_eq!(s.direction, Some(Direction::Right));
/// assert!((s.offset.length() - 50.0).abs() < 1e-9);
/// ```
pub fn sample(pointer: Vec2, geometry: &StickGeometry) -> StickSample {
    let delta = pointer - geometry.center;
    let distance = delta.length();

    StickSample {
        offset: delta.clamped_to(geometry.radius),
        direction: classify(delta, distance, geometry.dead_zone),
    }
}

/// Classify a displacement into a direction, or `None` inside the dead
/// zone. The dead-zone comparison is inclusive: a displacement of exactly
/// `dead_zone` pixels is still neutral.
fn classify(delta: Vec2, distance: f64, dead_zone: f64) -> Option<Direction> {
    if distance <= dead_zone {
        return None;
    }

    // Larger axis wins; ties fall to the X branch.
    if delta.x.abs() >= delta.y.abs() {
        Some(if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else {
        // Screen coordinates: positive Y is toward the operator.
        Some(if delta.y > 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        })
    }
}
