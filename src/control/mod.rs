//! Control surfaces - pointer/touch input to discrete motion commands
//!
//! Each surface (joystick, slider bank, directional pad, gesture surface)
//! is an independent state machine that classifies continuous input into
//! the shared [`Direction`] vocabulary and reports commands through a
//! [`ControlSink`]. Surfaces never talk to each other; the router merges
//! their output.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

pub mod gestures;
pub mod joystick;
pub mod pad;
pub mod sampler;
pub mod sliders;

pub use gestures::{GestureEvent, SwipeDirection, SwipeRecognizer};
pub use joystick::JoystickController;
pub use pad::{DirectionalPad, PadButton};
pub use sampler::{sample, StickGeometry, StickSample};
pub use sliders::{SliderBank, SliderChannel};

/// Discrete motion command understood by the vehicle.
///
/// Neutral ("no command") is modeled as `Option<Direction>::None`; equality
/// is the only operation debouncing needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    RotateLeft,
    RotateRight,
}

impl Direction {
    /// Wire name of the command, as the vehicle link expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::RotateLeft => "rotate-left",
            Direction::RotateRight => "rotate-right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "rotate-left" => Ok(Direction::RotateLeft),
            "rotate-right" => Ok(Direction::RotateRight),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// A point or displacement in viewport pixel coordinates.
///
/// Y grows downward, as on every pointer event source this gateway speaks
/// to; "forward" is therefore negative Y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Rescale the vector to `max` length if it is longer, preserving its
    /// angle. Near-zero vectors are returned unchanged so the rescale can
    /// never divide by zero.
    pub fn clamped_to(self, max: f64) -> Vec2 {
        let len = self.length();
        if len <= max || len <= f64::EPSILON {
            return self;
        }
        let scale = max / len;
        Vec2::new(self.x * scale, self.y * scale)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Callback invoked by a control surface for every debounced command.
///
/// Joystick, sliders and the gesture surface are edge-triggered (one call
/// per classification change); only the directional pad may repeat an
/// identical direction on repeated press.
pub type ControlSink = Arc<dyn Fn(Direction) + Send + Sync>;
