//! Router - orchestration of control surfaces, state, and drivers
//!
//! The router owns the four control surfaces, the vehicle store, the
//! mocked link, and the driver registry. Surfaces classify input into
//! commands; the router is the single merge point: it gates commands on
//! power and link state, pulses haptics, records the last action, and
//! dispatches to every registered driver through one sequential event
//! pump, so the vehicle's "active direction" is always simply the latest
//! accepted command.

#[cfg(test)]
mod tests;

use anyhow::{bail, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::control::gestures::GestureSink;
use crate::control::{
    ControlSink, Direction, DirectionalPad, GestureEvent, JoystickController, PadButton,
    SliderBank, SliderChannel, SwipeDirection, SwipeRecognizer, Vec2,
};
use crate::drivers::{CommandSource, DispatchContext, Driver, VehicleLinkDriver};
use crate::haptics::SharedHaptics;
use crate::state::{ControllerKind, VehicleSnapshot, VehicleStore};

/// Event consumed by the router's sequential pump.
#[derive(Debug, Clone, Copy)]
enum RouterEvent {
    Control {
        direction: Direction,
        source: CommandSource,
    },
    LongPress,
}

/// The four control surfaces, driven under one lock so input events for
/// one stream are processed strictly in arrival order.
struct ControlSet {
    joystick: JoystickController,
    sliders: SliderBank,
    pad: DirectionalPad,
    gestures: SwipeRecognizer,
}

impl ControlSet {
    fn set_enabled(&mut self, enabled: bool) {
        self.joystick.set_enabled(enabled);
        self.sliders.set_enabled(enabled);
        self.pad.set_enabled(enabled);
        self.gestures.set_enabled(enabled);
    }

    /// Drop whatever interaction is in flight, as switching the visible
    /// controller does.
    fn reset_transients(&mut self) {
        self.joystick.release();
        self.pad.release();
        self.sliders.reset();
    }
}

/// Central orchestrator. Create with [`Router::new`]; all methods take
/// `&self`, state lives behind interior mutability so the router is shared
/// as `Arc<Router>`.
pub struct Router {
    config: Arc<RwLock<AppConfig>>,
    drivers: Arc<RwLock<HashMap<String, Arc<dyn Driver>>>>,
    store: Arc<VehicleStore>,
    controls: Arc<Mutex<ControlSet>>,
    link: Arc<VehicleLinkDriver>,
    haptics: SharedHaptics,
}

impl Router {
    /// Build the router and start its event pump. Must run inside a tokio
    /// runtime.
    pub fn new(config: AppConfig, haptics: SharedHaptics) -> Arc<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let store = Arc::new(VehicleStore::new());

        let joystick_sink = Self::control_sink(&event_tx, CommandSource::Joystick);
        let slider_sink = Self::control_sink(&event_tx, CommandSource::Sliders);
        let pad_sink = Self::control_sink(&event_tx, CommandSource::Pad);

        let gesture_sink: GestureSink = {
            let tx = event_tx.clone();
            Arc::new(move |event| {
                let routed = match event {
                    GestureEvent::Swipe(swipe) => RouterEvent::Control {
                        direction: swipe_direction(swipe),
                        source: CommandSource::Gesture,
                    },
                    GestureEvent::LongPress => RouterEvent::LongPress,
                };
                let _ = tx.send(routed);
            })
        };

        let mut controls = ControlSet {
            joystick: JoystickController::new(
                config.controls.joystick.geometry(Vec2::ZERO),
                joystick_sink,
            ),
            sliders: SliderBank::new(config.controls.sliders.threshold, slider_sink),
            pad: DirectionalPad::new(pad_sink),
            gestures: SwipeRecognizer::with_long_press(
                config.controls.gestures.thresholds(),
                gesture_sink,
            ),
        };
        // Powered off until the operator releases the emergency stop
        controls.set_enabled(false);
        let controls = Arc::new(Mutex::new(controls));

        let link = Arc::new(VehicleLinkDriver::new(config.link.connect_delay()));
        {
            let store = store.clone();
            let controls = controls.clone();
            link.subscribe_status(Arc::new(move |status| {
                store.set_link_status(status);
                controls.lock().set_enabled(store.controls_enabled());
            }));
        }

        let router = Arc::new(Self {
            config: Arc::new(RwLock::new(config)),
            drivers: Arc::new(RwLock::new(HashMap::new())),
            store,
            controls,
            link,
            haptics,
        });

        Self::spawn_event_pump(event_rx, Arc::downgrade(&router));
        router
    }

    fn control_sink(
        tx: &mpsc::UnboundedSender<RouterEvent>,
        source: CommandSource,
    ) -> ControlSink {
        let tx = tx.clone();
        Arc::new(move |direction| {
            let _ = tx.send(RouterEvent::Control { direction, source });
        })
    }

    /// Single task consuming events in order. Holding only a weak
    /// reference lets the pump wind down once the router is gone.
    fn spawn_event_pump(
        mut event_rx: mpsc::UnboundedReceiver<RouterEvent>,
        router: Weak<Router>,
    ) {
        tokio::spawn(async move {
            debug!("router event pump started");
            while let Some(event) = event_rx.recv().await {
                let Some(router) = router.upgrade() else {
                    break;
                };
                router.process_event(event).await;
            }
            debug!("router event pump stopped");
        });
    }

    /// The mocked vehicle link, for registration as a driver.
    pub fn link(&self) -> Arc<VehicleLinkDriver> {
        self.link.clone()
    }

    pub fn store(&self) -> Arc<VehicleStore> {
        self.store.clone()
    }

    // ----- input entry points -------------------------------------------

    pub fn joystick_press(&self, pointer: Vec2) {
        self.controls.lock().joystick.press(pointer);
    }

    pub fn joystick_motion(&self, pointer: Vec2) {
        self.controls.lock().joystick.motion(pointer);
    }

    pub fn joystick_release(&self) {
        self.controls.lock().joystick.release();
    }

    pub fn is_joystick_dragging(&self) -> bool {
        self.controls.lock().joystick.is_dragging()
    }

    pub fn joystick_offset(&self) -> Vec2 {
        self.controls.lock().joystick.offset()
    }

    pub fn slider_input(&self, channel: SliderChannel, value: f64) {
        self.controls.lock().sliders.set_value(channel, value);
    }

    pub fn sliders_reset(&self) {
        self.controls.lock().sliders.reset();
    }

    pub fn slider_value(&self, channel: SliderChannel) -> f64 {
        self.controls.lock().sliders.value(channel)
    }

    pub fn pad_press(&self, button: PadButton) {
        self.controls.lock().pad.press(button);
    }

    pub fn pad_release(&self) {
        self.controls.lock().pad.release();
    }

    pub fn pad_leave(&self, button: PadButton) {
        self.controls.lock().pad.pointer_leave(button);
    }

    pub fn touch_start(&self, position: Vec2, touches: usize) {
        self.controls.lock().gestures.touch_start(position, touches);
    }

    pub fn touch_move(&self, position: Vec2) {
        self.controls.lock().gestures.touch_move(position);
    }

    pub fn touch_end(&self, position: Vec2) {
        self.controls.lock().gestures.touch_end(position);
    }

    // ----- vehicle operations -------------------------------------------

    /// Power the vehicle on or off (the emergency-stop toggle). Powering
    /// on starts the link handshake; powering off drops it immediately.
    pub async fn set_power(&self, on: bool) {
        self.haptics.pulse(&[300]);
        self.store.set_power(on);
        self.controls.lock().set_enabled(self.store.controls_enabled());
        if on {
            info!("power on, bringing up vehicle link");
            self.link.connect();
        } else {
            info!("emergency stop engaged");
            self.link.disconnect();
        }
    }

    /// Flip the power state; returns the new state.
    pub async fn toggle_power(&self) -> bool {
        let on = !self.store.power_on();
        self.set_power(on).await;
        on
    }

    /// Select which control surface the operator drives with. Whatever
    /// interaction was in flight on the previous surface is dropped.
    pub fn switch_controller(&self, kind: ControllerKind) {
        self.haptics.pulse(&[50, 50, 50]);
        self.store.set_controller(kind);
        self.controls.lock().reset_transients();
        info!(%kind, "controller switched");
    }

    pub async fn snapshot(&self) -> VehicleSnapshot {
        let vehicle = self.config.read().await.vehicle.name.clone();
        self.store.snapshot(&vehicle)
    }

    // ----- event pump ---------------------------------------------------

    async fn process_event(&self, event: RouterEvent) {
        match event {
            RouterEvent::LongPress => {
                let on = self.toggle_power().await;
                info!(power_on = on, "long-press toggled emergency stop");
            }
            RouterEvent::Control { direction, source } => {
                self.handle_control(direction, source).await;
            }
        }
    }

    /// Gate, record, and dispatch one classified command. The gate is the
    /// second line of defense: surfaces are disabled while the vehicle is
    /// not drivable, but commands already in the queue when the state
    /// flips must not leak through either.
    async fn handle_control(&self, direction: Direction, source: CommandSource) {
        if !self.store.controls_enabled() {
            debug!(%direction, %source, "command dropped, vehicle not drivable");
            return;
        }

        self.haptics.pulse(&[50]);
        self.store.set_last_action(direction);

        let ctx = DispatchContext {
            vehicle: self.config.read().await.vehicle.name.clone(),
            source,
        };

        let drivers: Vec<(String, Arc<dyn Driver>)> = {
            let map = self.drivers.read().await;
            map.iter().map(|(n, d)| (n.clone(), d.clone())).collect()
        };
        for (name, driver) in drivers {
            if let Err(e) = driver.execute(direction, &ctx).await {
                error!("driver '{name}' failed to execute {direction}: {e:#}");
            }
        }
    }

    // ----- driver registry ----------------------------------------------

    /// Register and initialize a driver under a unique name.
    pub async fn register_driver(&self, name: String, driver: Arc<dyn Driver>) -> Result<()> {
        {
            let drivers = self.drivers.read().await;
            if drivers.contains_key(&name) {
                bail!("driver '{name}' already registered");
            }
        }
        driver.init().await?;
        self.drivers.write().await.insert(name.clone(), driver);
        info!("registered driver: {name}");
        Ok(())
    }

    pub async fn list_drivers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn get_driver(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.read().await.get(name).cloned()
    }

    /// Shut every driver down and clear the registry.
    pub async fn shutdown_all_drivers(&self) -> Result<()> {
        let drivers = std::mem::take(&mut *self.drivers.write().await);
        for (name, driver) in drivers {
            if let Err(e) = driver.shutdown().await {
                error!("driver '{name}' failed to shut down: {e:#}");
            }
        }
        Ok(())
    }

    // ----- configuration ------------------------------------------------

    /// Apply a reloaded configuration: thresholds take effect immediately,
    /// live sessions are kept.
    pub async fn update_config(&self, new_config: AppConfig) -> Result<()> {
        new_config.validate()?;

        {
            let mut controls = self.controls.lock();
            let center = controls.joystick.geometry().center;
            controls
                .joystick
                .set_geometry(new_config.controls.joystick.geometry(center));
            controls
                .sliders
                .set_threshold(new_config.controls.sliders.threshold);
            controls
                .gestures
                .set_thresholds(new_config.controls.gestures.thresholds());
        }
        self.link.set_connect_delay(new_config.link.connect_delay());

        *self.config.write().await = new_config;
        info!("configuration applied");
        Ok(())
    }
}

/// Swipes map onto motion commands in screen terms: swiping up drives
/// forward, swiping down backward.
fn swipe_direction(swipe: SwipeDirection) -> Direction {
    match swipe {
        SwipeDirection::Up => Direction::Forward,
        SwipeDirection::Down => Direction::Backward,
        SwipeDirection::Left => Direction::Left,
        SwipeDirection::Right => Direction::Right,
    }
}
