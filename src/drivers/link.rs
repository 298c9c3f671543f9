//! Mocked vehicle link
//!
//! Stands in for the radio transport: connecting takes the configured
//! delay before the link reports connected, disconnecting is immediate.
//! An epoch counter guards the delayed transition, so a disconnect (or a
//! reconnect) issued while a connect timer is pending invalidates that
//! timer's outcome.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{DispatchContext, Driver, StatusCallback};
use crate::control::Direction;
use crate::state::ConnectionStatus;

/// Mock connection layer to the vehicle.
pub struct VehicleLinkDriver {
    status: Arc<RwLock<ConnectionStatus>>,
    /// Bumped on every connect/disconnect; a pending connect timer only
    /// applies if the epoch it captured is still current.
    epoch: Arc<AtomicU64>,
    connect_delay: RwLock<Duration>,
    callback: Arc<RwLock<Option<StatusCallback>>>,
    last_forwarded: RwLock<Option<Direction>>,
}

impl VehicleLinkDriver {
    pub fn new(connect_delay: Duration) -> Self {
        Self {
            status: Arc::new(RwLock::new(ConnectionStatus::Disconnected)),
            epoch: Arc::new(AtomicU64::new(0)),
            connect_delay: RwLock::new(connect_delay),
            callback: Arc::new(RwLock::new(None)),
            last_forwarded: RwLock::new(None),
        }
    }

    /// Takes effect from the next connect.
    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.write() = delay;
    }

    /// Last command actually forwarded over the (mock) link.
    pub fn last_forwarded(&self) -> Option<Direction> {
        *self.last_forwarded.read()
    }

    /// Begin connecting. Reports `Connecting` at once and `Connected`
    /// after the configured delay, unless superseded in the meantime.
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        Self::transition(&self.status, &self.callback, ConnectionStatus::Connecting);
        info!("vehicle link connecting");

        let delay = *self.connect_delay.read();
        let status = self.status.clone();
        let callback = self.callback.clone();
        let epochs = self.epoch.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if epochs.load(Ordering::SeqCst) != epoch {
                debug!("stale connect timer discarded");
                return;
            }
            Self::transition(&status, &callback, ConnectionStatus::Connected);
            info!("vehicle link connected");
        });
    }

    /// Drop the link immediately and invalidate any pending connect.
    pub fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        Self::transition(&self.status, &self.callback, ConnectionStatus::Disconnected);
        info!("vehicle link disconnected");
    }

    fn transition(
        status: &Arc<RwLock<ConnectionStatus>>,
        callback: &Arc<RwLock<Option<StatusCallback>>>,
        next: ConnectionStatus,
    ) {
        *status.write() = next;
        let callback = callback.read().clone();
        if let Some(callback) = callback {
            callback(next);
        }
    }
}

#[async_trait]
impl Driver for VehicleLinkDriver {
    fn name(&self) -> &str {
        "vehicle-link"
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, direction: Direction, _ctx: &DispatchContext) -> Result<()> {
        if *self.status.read() != ConnectionStatus::Connected {
            warn!(%direction, "vehicle link not connected, command dropped");
            return Ok(());
        }
        *self.last_forwarded.write() = Some(direction);
        debug!(%direction, "command forwarded over vehicle link");
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.disconnect();
        Ok(())
    }

    fn connection_status(&self) -> ConnectionStatus {
        *self.status.read()
    }

    fn subscribe_status(&self, callback: StatusCallback) {
        *self.callback.write() = Some(callback);
    }
}
