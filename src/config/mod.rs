//! Configuration management for the QuadBot gateway
//!
//! Handles loading, validating, and hot-reloading the YAML configuration.
//! Every section has defaults, so an empty file (or no overrides at all)
//! yields a working gateway.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

use crate::control::gestures::GestureThresholds;
use crate::control::{StickGeometry, Vec2};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
}

/// Identity of the vehicle this gateway fronts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleConfig {
    #[serde(default = "default_vehicle_name")]
    pub name: String,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            name: default_vehicle_name(),
        }
    }
}

/// Mocked link behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Delay between power-on and the link reporting connected.
    #[serde(default = "default_connect_delay_ms")]
    pub connect_delay_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_delay_ms: default_connect_delay_ms(),
        }
    }
}

impl LinkConfig {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

/// Thresholds for all control surfaces.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ControlsConfig {
    #[serde(default)]
    pub joystick: JoystickConfig,
    #[serde(default)]
    pub sliders: SlidersConfig,
    #[serde(default)]
    pub gestures: GesturesConfig,
}

/// Virtual joystick geometry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JoystickConfig {
    /// Maximum handle travel from the center, px.
    #[serde(default = "default_joystick_radius")]
    pub radius: f64,
    /// Displacements within this distance classify as neutral, px.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f64,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            radius: default_joystick_radius(),
            dead_zone: default_dead_zone(),
        }
    }
}

impl JoystickConfig {
    /// Geometry for a joystick centered at `center`.
    pub fn geometry(&self, center: Vec2) -> StickGeometry {
        StickGeometry::new(center, self.radius, self.dead_zone)
    }
}

/// Axis-slider hysteresis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlidersConfig {
    /// Minimum deviation from the 50 rest position before a channel
    /// classifies away from neutral.
    #[serde(default = "default_slider_threshold")]
    pub threshold: f64,
}

impl Default for SlidersConfig {
    fn default() -> Self {
        Self {
            threshold: default_slider_threshold(),
        }
    }
}

/// Whole-surface gesture thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GesturesConfig {
    /// Minimum single-axis displacement for a swipe, px.
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
    /// Maximum press-to-release time for a swipe.
    #[serde(default = "default_swipe_window_ms")]
    pub swipe_window_ms: u64,
    /// Hold time before a long-press fires.
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
}

impl Default for GesturesConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: default_swipe_threshold(),
            swipe_window_ms: default_swipe_window_ms(),
            long_press_ms: default_long_press_ms(),
        }
    }
}

impl GesturesConfig {
    pub fn thresholds(&self) -> GestureThresholds {
        GestureThresholds {
            swipe_distance: self.swipe_threshold,
            swipe_window: Duration::from_millis(self.swipe_window_ms),
            long_press: Duration::from_millis(self.long_press_ms),
        }
    }
}

/// Sensor simulation cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_interval_ms")]
    pub interval_ms: u64,
    /// Fixed RNG seed for reproducible sensor walks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_telemetry_interval_ms(),
            seed: None,
        }
    }
}

impl TelemetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Operator-device vibration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HapticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_vehicle_name() -> String {
    "QUADBOT-X1".to_string()
}

fn default_connect_delay_ms() -> u64 {
    2000
}

fn default_joystick_radius() -> f64 {
    50.0
}

fn default_dead_zone() -> f64 {
    10.0
}

fn default_slider_threshold() -> f64 {
    10.0
}

fn default_swipe_threshold() -> f64 {
    50.0
}

fn default_swipe_window_ms() -> u64 {
    300
}

fn default_long_press_ms() -> u64 {
    500
}

fn default_telemetry_interval_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

/// Validation failure for a loaded configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("joystick dead zone ({dead_zone}) must be smaller than the radius ({radius})")]
    DeadZoneTooLarge { dead_zone: f64, radius: f64 },
    #[error("slider threshold ({threshold}) must stay below half the travel range (50)")]
    SliderThresholdTooLarge { threshold: f64 },
    #[error("{field} must be at least 1 ms")]
    ZeroDuration { field: &'static str },
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Check every threshold for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let joystick = &self.controls.joystick;
        if joystick.radius <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "controls.joystick.radius",
                value: joystick.radius,
            });
        }
        if joystick.dead_zone < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "controls.joystick.dead_zone",
                value: joystick.dead_zone,
            });
        }
        if joystick.dead_zone >= joystick.radius {
            return Err(ConfigError::DeadZoneTooLarge {
                dead_zone: joystick.dead_zone,
                radius: joystick.radius,
            });
        }

        let threshold = self.controls.sliders.threshold;
        if threshold <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "controls.sliders.threshold",
                value: threshold,
            });
        }
        if threshold >= 50.0 {
            return Err(ConfigError::SliderThresholdTooLarge { threshold });
        }

        let gestures = &self.controls.gestures;
        if gestures.swipe_threshold <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "controls.gestures.swipe_threshold",
                value: gestures.swipe_threshold,
            });
        }
        if gestures.swipe_window_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "controls.gestures.swipe_window_ms",
            });
        }
        if gestures.long_press_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "controls.gestures.long_press_ms",
            });
        }

        if self.telemetry.interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "telemetry.interval_ms",
            });
        }

        Ok(())
    }
}
