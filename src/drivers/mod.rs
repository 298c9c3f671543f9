//! Command-sink drivers
//!
//! Every consumer of classified motion commands implements [`Driver`]; the
//! router dispatches each accepted command to all registered drivers. All
//! methods take `&self` so drivers live behind `Arc<dyn Driver>`;
//! implementations use interior mutability for state.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::control::Direction;
use crate::state::ConnectionStatus;

pub mod console;
pub mod link;

pub use console::ConsoleDriver;
pub use link::VehicleLinkDriver;

/// Callback type for connection status changes.
pub type StatusCallback = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// Which surface classified a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Pad,
    Joystick,
    Sliders,
    Gesture,
}

impl std::fmt::Display for CommandSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandSource::Pad => write!(f, "pad"),
            CommandSource::Joystick => write!(f, "joystick"),
            CommandSource::Sliders => write!(f, "sliders"),
            CommandSource::Gesture => write!(f, "gesture"),
        }
    }
}

/// Context handed to drivers with every dispatched command.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Vehicle name from the configuration.
    pub vehicle: String,
    /// Control surface the command came from.
    pub source: CommandSource,
}

/// A command sink the router can dispatch to.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Driver name (e.g. "console", "vehicle-link").
    fn name(&self) -> &str;

    /// Initialize the driver (open resources, reset counters).
    async fn init(&self) -> Result<()>;

    /// Forward one classified motion command.
    async fn execute(&self, direction: Direction, ctx: &DispatchContext) -> Result<()>;

    /// Shut the driver down gracefully.
    async fn shutdown(&self) -> Result<()>;

    /// Current connection state of the driver.
    ///
    /// Default: always connected (for sinks without a link of their own).
    fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus::Connected
    }

    /// Subscribe to connection status changes.
    ///
    /// Default: no-op (not every driver tracks a connection).
    fn subscribe_status(&self, _callback: StatusCallback) {}
}
