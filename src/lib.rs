//! QuadBot GW - teleoperation gateway for the QUADBOT-X1 rover
//!
//! Translates pointer/touch control-surface input (virtual joystick, axis
//! sliders, directional pad, whole-surface swipe and long-press gestures)
//! into discrete, debounced motion commands and forwards them to pluggable
//! command-sink drivers over a mocked vehicle link.

pub mod cli;
pub mod config;
pub mod control;
pub mod drivers;
pub mod haptics;
pub mod router;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use control::Direction;
pub use router::Router;
