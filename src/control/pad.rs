//! Directional pad - discrete press/hold/release buttons
//!
//! No geometry and no thresholds: a press emits its button's direction
//! immediately. The only state beyond the sink is the active-button marker
//! the surface uses for visual feedback.

use tracing::debug;

use super::{ControlSink, Direction};

/// One of the six pad buttons. Each maps 1:1 to a direction; no two
/// buttons share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    Forward,
    Backward,
    Left,
    Right,
    RotateLeft,
    RotateRight,
}

impl PadButton {
    pub const ALL: [PadButton; 6] = [
        PadButton::Forward,
        PadButton::Backward,
        PadButton::Left,
        PadButton::Right,
        PadButton::RotateLeft,
        PadButton::RotateRight,
    ];

    pub fn direction(self) -> Direction {
        match self {
            PadButton::Forward => Direction::Forward,
            PadButton::Backward => Direction::Backward,
            PadButton::Left => Direction::Left,
            PadButton::Right => Direction::Right,
            PadButton::RotateLeft => Direction::RotateLeft,
            PadButton::RotateRight => Direction::RotateRight,
        }
    }

    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Forward => PadButton::Forward,
            Direction::Backward => PadButton::Backward,
            Direction::Left => PadButton::Left,
            Direction::Right => PadButton::Right,
            Direction::RotateLeft => PadButton::RotateLeft,
            Direction::RotateRight => PadButton::RotateRight,
        }
    }
}

/// Press-triggered button grid.
pub struct DirectionalPad {
    active: Option<PadButton>,
    enabled: bool,
    sink: ControlSink,
}

impl DirectionalPad {
    pub fn new(sink: ControlSink) -> Self {
        Self {
            active: None,
            enabled: true,
            sink,
        }
    }

    /// Button currently held, for visual feedback only.
    pub fn active_button(&self) -> Option<PadButton> {
        self.active
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.active = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Button press (touch-start or mouse-down). Emits the button's
    /// direction immediately; a repeated press of the same button emits
    /// again. Ignored while disabled.
    pub fn press(&mut self, button: PadButton) {
        if !self.enabled {
            return;
        }
        self.active = Some(button);
        let direction = button.direction();
        debug!(%direction, "pad press");
        (self.sink)(direction);
    }

    /// Button release. Clears the marker, emits nothing.
    pub fn release(&mut self) {
        self.active = None;
    }

    /// Pointer left a button while held. Clears the marker only if that
    /// button is the active one.
    pub fn pointer_leave(&mut self, button: PadButton) {
        if self.active == Some(button) {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::test_support::Recorder;

    #[test]
    fn test_every_button_maps_to_unique_direction() {
        let mut seen = std::collections::HashSet::new();
        for button in PadButton::ALL {
            assert!(seen.insert(button.direction()));
            assert_eq!(PadButton::from_direction(button.direction()), button);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_press_emits_immediately() {
        let rec = Recorder::new();
        let mut pad = DirectionalPad::new(rec.sink());

        pad.press(PadButton::RotateLeft);
        assert_eq!(pad.active_button(), Some(PadButton::RotateLeft));
        assert_eq!(rec.take(), vec![Direction::RotateLeft]);
    }

    #[test]
    fn test_repeat_press_reemits() {
        let rec = Recorder::new();
        let mut pad = DirectionalPad::new(rec.sink());

        pad.press(PadButton::Forward);
        pad.release();
        pad.press(PadButton::Forward);
        assert_eq!(rec.take(), vec![Direction::Forward, Direction::Forward]);
    }

    #[test]
    fn test_release_is_silent() {
        let rec = Recorder::new();
        let mut pad = DirectionalPad::new(rec.sink());

        pad.press(PadButton::Left);
        rec.take();
        pad.release();
        assert_eq!(pad.active_button(), None);
        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_pointer_leave_clears_only_active_button() {
        let rec = Recorder::new();
        let mut pad = DirectionalPad::new(rec.sink());

        pad.press(PadButton::Right);
        pad.pointer_leave(PadButton::Forward); // Different button: no-op
        assert_eq!(pad.active_button(), Some(PadButton::Right));

        pad.pointer_leave(PadButton::Right);
        assert_eq!(pad.active_button(), None);
    }

    #[test]
    fn test_disabled_pad_ignores_press() {
        let rec = Recorder::new();
        let mut pad = DirectionalPad::new(rec.sink());
        pad.set_enabled(false);

        pad.press(PadButton::Backward);
        assert_eq!(pad.active_button(), None);
        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_disable_clears_held_marker() {
        let rec = Recorder::new();
        let mut pad = DirectionalPad::new(rec.sink());

        pad.press(PadButton::Backward);
        pad.set_enabled(false);
        assert_eq!(pad.active_button(), None);
    }
}
