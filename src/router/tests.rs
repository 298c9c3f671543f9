//! Tests for the router

use super::*;
use crate::drivers::ConsoleDriver;
use crate::haptics::test_support::RecordingHaptics;
use crate::haptics::NoopHaptics;
use crate::state::ConnectionStatus;
use async_trait::async_trait;
use std::time::Duration;

/// Let the event pump drain everything already queued. Under a paused
/// clock the runtime only advances time once no task is runnable, so a
/// minimal sleep is a deterministic barrier.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn test_config() -> AppConfig {
    AppConfig::default()
}

/// Driver recording every dispatched command.
#[derive(Default)]
struct RecordingDriver {
    commands: Mutex<Vec<(Direction, CommandSource)>>,
}

impl RecordingDriver {
    fn take(&self) -> Vec<(Direction, CommandSource)> {
        std::mem::take(&mut *self.commands.lock())
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    fn name(&self) -> &str {
        "recording"
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, direction: Direction, ctx: &DispatchContext) -> Result<()> {
        self.commands.lock().push((direction, ctx.source));
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Router with a recording driver, powered on and connected.
async fn powered_router() -> (Arc<Router>, Arc<RecordingDriver>) {
    let router = Router::new(test_config(), Arc::new(NoopHaptics));
    let recording = Arc::new(RecordingDriver::default());
    router
        .register_driver("recording".to_string(), recording.clone())
        .await
        .unwrap();
    router.set_power(true).await;
    tokio::time::sleep(Duration::from_millis(2100)).await;
    (router, recording)
}

#[tokio::test(start_paused = true)]
async fn test_power_on_connects_after_delay() {
    let router = Router::new(test_config(), Arc::new(NoopHaptics));

    assert!(!router.store().power_on());
    router.set_power(true).await;

    let snapshot = router.snapshot().await;
    assert!(snapshot.power_on);
    assert_eq!(snapshot.link, ConnectionStatus::Connecting);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(router.store().link_status(), ConnectionStatus::Connected);
    assert!(router.store().controls_enabled());
}

#[tokio::test(start_paused = true)]
async fn test_commands_gated_until_connected() {
    let router = Router::new(test_config(), Arc::new(NoopHaptics));
    let recording = Arc::new(RecordingDriver::default());
    router
        .register_driver("recording".to_string(), recording.clone())
        .await
        .unwrap();

    // Not powered: the pad is disabled and nothing reaches the drivers
    router.pad_press(PadButton::Forward);
    settle().await;
    assert!(recording.take().is_empty());

    // Powered but still connecting: same outcome
    router.set_power(true).await;
    router.pad_press(PadButton::Forward);
    settle().await;
    assert!(recording.take().is_empty());
    assert_eq!(router.store().last_action(), None);

    // Connected: commands flow
    tokio::time::sleep(Duration::from_millis(2100)).await;
    router.pad_press(PadButton::Forward);
    settle().await;
    assert_eq!(
        recording.take(),
        vec![(Direction::Forward, CommandSource::Pad)]
    );
    assert_eq!(router.store().last_action(), Some(Direction::Forward));
}

#[tokio::test(start_paused = true)]
async fn test_emergency_stop_blocks_further_commands() {
    let (router, recording) = powered_router().await;

    router.pad_press(PadButton::Left);
    settle().await;
    assert_eq!(recording.take(), vec![(Direction::Left, CommandSource::Pad)]);

    router.set_power(false).await;
    assert_eq!(router.store().link_status(), ConnectionStatus::Disconnected);

    router.pad_press(PadButton::Left);
    settle().await;
    assert!(recording.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_joystick_drag_dispatches_each_edge() {
    let (router, recording) = powered_router().await;

    router.joystick_press(Vec2::ZERO);
    router.joystick_motion(Vec2::new(40.0, 0.0));
    router.joystick_motion(Vec2::new(45.0, 0.0)); // Same direction, debounced
    router.joystick_motion(Vec2::new(0.0, -40.0));
    router.joystick_release();
    settle().await;

    assert_eq!(
        recording.take(),
        vec![
            (Direction::Right, CommandSource::Joystick),
            (Direction::Forward, CommandSource::Joystick),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_disable_mid_drag_stops_emissions() {
    let (router, recording) = powered_router().await;

    router.joystick_press(Vec2::new(40.0, 0.0));
    settle().await;
    assert_eq!(
        recording.take(),
        vec![(Direction::Right, CommandSource::Joystick)]
    );
    assert!(router.is_joystick_dragging());

    router.set_power(false).await;
    assert!(!router.is_joystick_dragging());

    // Surface keeps streaming stale motion: nothing more may fire
    router.joystick_motion(Vec2::new(0.0, 40.0));
    router.joystick_motion(Vec2::new(-40.0, 0.0));
    settle().await;
    assert!(recording.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slider_hysteresis_end_to_end() {
    let (router, recording) = powered_router().await;

    router.slider_input(SliderChannel::Drive, 80.0);
    router.slider_input(SliderChannel::Drive, 85.0);
    router.slider_input(SliderChannel::Drive, 50.0);
    router.slider_input(SliderChannel::Drive, 20.0);
    settle().await;

    assert_eq!(
        recording.take(),
        vec![
            (Direction::Backward, CommandSource::Sliders),
            (Direction::Forward, CommandSource::Sliders),
        ]
    );
    assert_eq!(router.store().last_action(), Some(Direction::Forward));
}

#[tokio::test(start_paused = true)]
async fn test_swipe_maps_to_motion_command() {
    let (router, recording) = powered_router().await;

    router.touch_start(Vec2::new(100.0, 100.0), 1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    router.touch_end(Vec2::new(100.0, 200.0));
    settle().await;

    assert_eq!(
        recording.take(),
        vec![(Direction::Backward, CommandSource::Gesture)]
    );

    // Too slow: not a swipe
    router.touch_start(Vec2::new(100.0, 100.0), 1);
    tokio::time::sleep(Duration::from_millis(400)).await;
    router.touch_end(Vec2::new(100.0, 200.0));
    settle().await;
    assert!(recording.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_long_press_engages_emergency_stop() {
    let (router, recording) = powered_router().await;

    router.touch_start(Vec2::new(100.0, 100.0), 1);
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(!router.store().power_on());
    assert_eq!(router.store().link_status(), ConnectionStatus::Disconnected);

    // The held touch lifting afterwards must not also fire a swipe
    router.touch_end(Vec2::new(100.0, 300.0));
    settle().await;
    assert!(recording.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_switch_controller_resets_in_flight_state() {
    let (router, _recording) = powered_router().await;

    router.joystick_press(Vec2::new(40.0, 0.0));
    router.slider_input(SliderChannel::Rotate, 90.0);
    assert!(router.is_joystick_dragging());

    router.switch_controller(ControllerKind::Sliders);
    assert_eq!(router.store().controller(), ControllerKind::Sliders);
    assert!(!router.is_joystick_dragging());
    assert_eq!(router.slider_value(SliderChannel::Rotate), 50.0);
}

#[tokio::test(start_paused = true)]
async fn test_haptic_patterns() {
    let haptics = Arc::new(RecordingHaptics::default());
    let router = Router::new(test_config(), haptics.clone());

    router.set_power(true).await;
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(haptics.take(), vec![vec![300]]);

    router.pad_press(PadButton::Right);
    settle().await;
    assert_eq!(haptics.take(), vec![vec![50]]);

    router.switch_controller(ControllerKind::Joystick);
    assert_eq!(haptics.take(), vec![vec![50, 50, 50]]);
}

#[tokio::test(start_paused = true)]
async fn test_driver_registration() {
    let router = Router::new(test_config(), Arc::new(NoopHaptics));

    let console = Arc::new(ConsoleDriver::new("console"));
    router
        .register_driver("console".to_string(), console)
        .await
        .unwrap();
    router
        .register_driver("vehicle".to_string(), router.link())
        .await
        .unwrap();

    // Names are unique
    let duplicate = Arc::new(ConsoleDriver::new("console"));
    assert!(router
        .register_driver("console".to_string(), duplicate)
        .await
        .is_err());

    assert_eq!(router.list_drivers().await, vec!["console", "vehicle"]);
    assert!(router.get_driver("console").await.is_some());
    assert!(router.get_driver("absent").await.is_none());

    router.shutdown_all_drivers().await.unwrap();
    assert!(router.list_drivers().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_commands_reach_the_vehicle_link() {
    let (router, _recording) = powered_router().await;
    router
        .register_driver("vehicle".to_string(), router.link())
        .await
        .unwrap();

    router.pad_press(PadButton::RotateRight);
    settle().await;
    assert_eq!(
        router.link().last_forwarded(),
        Some(Direction::RotateRight)
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_config_applies_thresholds() {
    let (router, recording) = powered_router().await;

    let mut relaxed = test_config();
    relaxed.controls.sliders.threshold = 30.0;
    router.update_config(relaxed).await.unwrap();

    // Deviation of 20 no longer classifies
    router.slider_input(SliderChannel::Drive, 70.0);
    settle().await;
    assert!(recording.take().is_empty());

    router.slider_input(SliderChannel::Drive, 85.0);
    settle().await;
    assert_eq!(
        recording.take(),
        vec![(Direction::Backward, CommandSource::Sliders)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_config_rejects_invalid_thresholds() {
    let (router, recording) = powered_router().await;

    let mut broken = test_config();
    broken.controls.joystick.dead_zone = 80.0;
    assert!(router.update_config(broken).await.is_err());

    // Old thresholds still in force
    router.joystick_press(Vec2::new(40.0, 0.0));
    settle().await;
    assert_eq!(
        recording.take(),
        vec![(Direction::Right, CommandSource::Joystick)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_pump_preserves_event_order() {
    let (router, recording) = powered_router().await;

    router.pad_press(PadButton::Forward);
    router.pad_press(PadButton::Backward);
    router.pad_press(PadButton::RotateLeft);
    settle().await;

    assert_eq!(
        recording.take(),
        vec![
            (Direction::Forward, CommandSource::Pad),
            (Direction::Backward, CommandSource::Pad),
            (Direction::RotateLeft, CommandSource::Pad),
        ]
    );
}
