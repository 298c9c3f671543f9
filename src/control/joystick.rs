//! Virtual joystick controller - drag lifecycle over the vector sampler
//!
//! Press starts a drag session, every motion sample re-classifies the
//! displacement, release tears the session down. Emission is
//! edge-triggered: a command fires only when the classified direction
//! changes, and never for neutral. While a drag is live the surface is
//! expected to route *all* pointer motion here, including motion outside
//! the widget bounds; `is_dragging` tells it when to do so.

use tracing::{debug, trace};

use super::sampler::{sample, StickGeometry};
use super::{ControlSink, Direction, Vec2};

/// Transient state of one pointer interaction. Created on press, destroyed
/// on release; never shared with another controller.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    offset: Vec2,
    direction: Option<Direction>,
}

/// Drag state machine over [`sample`].
pub struct JoystickController {
    geometry: StickGeometry,
    session: Option<DragSession>,
    enabled: bool,
    sink: ControlSink,
}

impl JoystickController {
    pub fn new(geometry: StickGeometry, sink: ControlSink) -> Self {
        Self {
            geometry,
            session: None,
            enabled: true,
            sink,
        }
    }

    /// Whether a drag session is live. The owning surface uses this to
    /// decide when surface-global motion/release events must be routed
    /// here, so the stick keeps tracking after the pointer leaves the
    /// widget bounds.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Current handle offset from the control center; zero when idle.
    pub fn offset(&self) -> Vec2 {
        self.session.map(|s| s.offset).unwrap_or(Vec2::ZERO)
    }

    /// Direction the live session last classified, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.session.and_then(|s| s.direction)
    }

    /// Update the control geometry (the widget may be laid out anew at any
    /// time). Takes effect from the next motion sample.
    pub fn set_geometry(&mut self, geometry: StickGeometry) {
        self.geometry = geometry;
    }

    pub fn geometry(&self) -> StickGeometry {
        self.geometry
    }

    /// Enable or disable the controller. Disabling mid-drag abandons the
    /// session: the offset resets and no further command can fire until a
    /// fresh press after re-enabling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.session.take().is_some() {
            debug!("joystick drag abandoned (controller disabled)");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pointer press (mouse-down or single-touch-start) on the widget.
    /// Ignored while disabled. The press position is sampled immediately,
    /// so a press already outside the dead zone emits right away.
    pub fn press(&mut self, pointer: Vec2) {
        if !self.enabled {
            return;
        }
        self.session = Some(DragSession {
            offset: Vec2::ZERO,
            direction: None,
        });
        self.motion(pointer);
    }

    /// Pointer motion, from the widget or from the whole surface. A motion
    /// event with no live session is silently ignored.
    pub fn motion(&mut self, pointer: Vec2) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let sampled = sample(pointer, &self.geometry);
        session.offset = sampled.offset;
        trace!(?pointer, offset = ?sampled.offset, "joystick motion sample");

        if sampled.direction != session.direction {
            session.direction = sampled.direction;
            if let Some(direction) = sampled.direction {
                debug!(%direction, "joystick direction change");
                (self.sink)(direction);
            }
        }
    }

    /// Pointer release (mouse-up, touch-end, or the pointer leaving the
    /// surface while held). Resets the handle to center and the recorded
    /// direction to neutral without emitting. Idempotent: the widget and
    /// the surface may both report the same release.
    pub fn release(&mut self) {
        if self.session.take().is_some() {
            debug!("joystick drag ended");
        }
    }
}
