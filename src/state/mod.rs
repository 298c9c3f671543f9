//! Vehicle state - status, sensors, and the shared store

mod store;
mod types;

pub use store::VehicleStore;
pub use types::{
    ConnectionStatus, ControllerKind, SensorLevel, SensorReadings, VehicleSnapshot,
};
