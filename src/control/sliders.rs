//! Axis-slider bank - three scalar channels with hysteresis
//!
//! Each channel maps a bounded [0,100] value centered at 50 onto a
//! direction pair and keeps its own last-fired memory, so one channel's
//! hysteresis can never clear a direction another channel fired. Returning
//! to the neutral band clears a channel's memory silently.

use tracing::debug;

use super::{ControlSink, Direction};

/// Slider travel range and rest position.
const RANGE_MIN: f64 = 0.0;
const RANGE_MAX: f64 = 100.0;
const CENTER: f64 = 50.0;

/// One scalar slider channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderChannel {
    /// Forward/backward travel (low end is forward).
    Drive,
    /// Left/right travel.
    Steer,
    /// Rotation in place.
    Rotate,
}

impl SliderChannel {
    pub const ALL: [SliderChannel; 3] =
        [SliderChannel::Drive, SliderChannel::Steer, SliderChannel::Rotate];

    /// Direction pair for this channel as `(below center, above center)`.
    fn directions(self) -> (Direction, Direction) {
        match self {
            SliderChannel::Drive => (Direction::Forward, Direction::Backward),
            SliderChannel::Steer => (Direction::Left, Direction::Right),
            SliderChannel::Rotate => (Direction::RotateLeft, Direction::RotateRight),
        }
    }

    fn index(self) -> usize {
        match self {
            SliderChannel::Drive => 0,
            SliderChannel::Steer => 1,
            SliderChannel::Rotate => 2,
        }
    }
}

impl std::fmt::Display for SliderChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliderChannel::Drive => write!(f, "drive"),
            SliderChannel::Steer => write!(f, "steer"),
            SliderChannel::Rotate => write!(f, "rotate"),
        }
    }
}

/// Per-channel slider state. Mutated only by its own channel's input.
#[derive(Debug, Clone, Copy)]
struct AxisState {
    value: f64,
    last_fired: Option<Direction>,
}

impl Default for AxisState {
    fn default() -> Self {
        Self {
            value: CENTER,
            last_fired: None,
        }
    }
}

/// Three independent slider channels sharing one hysteresis policy.
pub struct SliderBank {
    channels: [AxisState; 3],
    /// Minimum deviation from center before a channel reclassifies away
    /// from neutral.
    threshold: f64,
    enabled: bool,
    sink: ControlSink,
}

impl SliderBank {
    pub fn new(threshold: f64, sink: ControlSink) -> Self {
        Self {
            channels: [AxisState::default(); 3],
            threshold,
            enabled: true,
            sink,
        }
    }

    pub fn value(&self, channel: SliderChannel) -> f64 {
        self.channels[channel.index()].value
    }

    /// Direction this channel last fired and has not yet cleared.
    pub fn last_fired(&self, channel: SliderChannel) -> Option<Direction> {
        self.channels[channel.index()].last_fired
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Apply a new value to one channel. Inert while disabled. Emits at
    /// most one command: only when the classification is non-neutral and
    /// differs from the channel's own last-fired direction.
    pub fn set_value(&mut self, channel: SliderChannel, value: f64) {
        if !self.enabled {
            return;
        }

        let value = value.clamp(RANGE_MIN, RANGE_MAX);
        let state = &mut self.channels[channel.index()];
        state.value = value;

        let deviation = value - CENTER;
        let classified = if deviation.abs() > self.threshold {
            let (low, high) = channel.directions();
            Some(if deviation < 0.0 { low } else { high })
        } else {
            None
        };

        match classified {
            Some(direction) if state.last_fired != Some(direction) => {
                state.last_fired = Some(direction);
                debug!(%channel, %direction, value, "slider direction change");
                (self.sink)(direction);
            }
            Some(_) => {} // Same classification, debounced
            None => {
                // Back in the neutral band: clear silently
                state.last_fired = None;
            }
        }
    }

    /// Center every channel and clear all last-fired memory. Emits
    /// nothing. Works while disabled too, so a disabled bank can still be
    /// brought back to a known rest state.
    pub fn reset(&mut self) {
        self.channels = [AxisState::default(); 3];
        debug!("slider bank centered");
    }
}
