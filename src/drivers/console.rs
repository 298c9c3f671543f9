//! Console driver - logs every dispatched command
//!
//! Useful for driving the gateway without a vehicle attached and for
//! validating what the control surfaces classify.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{DispatchContext, Driver};
use crate::control::Direction;

/// Logs all dispatched commands with a running execution counter.
pub struct ConsoleDriver {
    name: String,
    initialized: Arc<RwLock<bool>>,
    execution_count: Arc<RwLock<u64>>,
}

impl ConsoleDriver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initialized: Arc::new(RwLock::new(false)),
            execution_count: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn execution_count(&self) -> u64 {
        *self.execution_count.read().await
    }
}

#[async_trait]
impl Driver for ConsoleDriver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&self) -> Result<()> {
        *self.initialized.write().await = true;
        *self.execution_count.write().await = 0;
        info!("console driver '{}' initialized", self.name);
        Ok(())
    }

    async fn execute(&self, direction: Direction, ctx: &DispatchContext) -> Result<()> {
        if !*self.initialized.read().await {
            warn!(
                "console driver '{}' not initialized, skipping command",
                self.name
            );
            return Ok(());
        }

        let mut count = self.execution_count.write().await;
        *count += 1;
        let exec_num = *count;
        drop(count);

        info!(
            "[{}] {} → {} (via {}) [#{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            ctx.vehicle,
            direction,
            ctx.source,
            exec_num
        );

        debug!(
            driver = %self.name,
            %direction,
            source = %ctx.source,
            exec_count = exec_num,
            "console driver dispatch"
        );

        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if *self.initialized.read().await {
            let final_count = *self.execution_count.read().await;
            info!(
                "console driver '{}' shutting down ({} commands forwarded)",
                self.name, final_count
            );
        }
        *self.initialized.write().await = false;
        Ok(())
    }
}
