//! Shared vehicle state store
//!
//! One synchronous store behind a single lock; every reader sees the
//! writers' most recent values. Handlers hold the lock only for the copy.

use parking_lot::RwLock;

use super::types::{ConnectionStatus, ControllerKind, SensorReadings, VehicleSnapshot};
use crate::control::Direction;

#[derive(Debug, Clone)]
struct VehicleState {
    power_on: bool,
    link: ConnectionStatus,
    controller: ControllerKind,
    last_action: Option<Direction>,
    sensors: SensorReadings,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            power_on: false,
            link: ConnectionStatus::Disconnected,
            controller: ControllerKind::Pad,
            last_action: None,
            sensors: SensorReadings::default(),
        }
    }
}

/// Store for everything the operator display and command gating read.
#[derive(Default)]
pub struct VehicleStore {
    inner: RwLock<VehicleState>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power_on(&self) -> bool {
        self.inner.read().power_on
    }

    pub fn set_power(&self, on: bool) {
        self.inner.write().power_on = on;
    }

    pub fn link_status(&self) -> ConnectionStatus {
        self.inner.read().link
    }

    pub fn set_link_status(&self, status: ConnectionStatus) {
        self.inner.write().link = status;
    }

    /// Commands are accepted only while powered on and connected.
    pub fn controls_enabled(&self) -> bool {
        let state = self.inner.read();
        state.power_on && state.link == ConnectionStatus::Connected
    }

    pub fn controller(&self) -> ControllerKind {
        self.inner.read().controller
    }

    pub fn set_controller(&self, kind: ControllerKind) {
        self.inner.write().controller = kind;
    }

    pub fn last_action(&self) -> Option<Direction> {
        self.inner.read().last_action
    }

    pub fn set_last_action(&self, direction: Direction) {
        self.inner.write().last_action = Some(direction);
    }

    pub fn sensors(&self) -> SensorReadings {
        self.inner.read().sensors
    }

    /// Apply a sensor update under the write lock.
    pub fn update_sensors(&self, update: impl FnOnce(&mut SensorReadings)) {
        update(&mut self.inner.write().sensors);
    }

    pub fn snapshot(&self, vehicle: &str) -> VehicleSnapshot {
        let state = self.inner.read();
        VehicleSnapshot {
            vehicle: vehicle.to_string(),
            power_on: state.power_on,
            link: state.link,
            controller: state.controller,
            last_action: state.last_action,
            sensors: state.sensors,
        }
    }
}
