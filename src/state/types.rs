//! Vehicle state type definitions

use serde::{Deserialize, Serialize};

use crate::control::Direction;

/// State of the (mocked) vehicle link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}

/// Which control surface the operator is currently driving with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    Pad,
    Joystick,
    Sliders,
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerKind::Pad => write!(f, "pad"),
            ControllerKind::Joystick => write!(f, "joystick"),
            ControllerKind::Sliders => write!(f, "sliders"),
        }
    }
}

impl std::str::FromStr for ControllerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pad" => Ok(ControllerKind::Pad),
            "joystick" => Ok(ControllerKind::Joystick),
            "sliders" => Ok(ControllerKind::Sliders),
            other => Err(format!("unknown controller kind: {other}")),
        }
    }
}

/// Severity of a sensor reading for the operator display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorLevel {
    Normal,
    Warning,
    Critical,
}

/// Latest simulated sensor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReadings {
    /// Battery charge, percent.
    pub battery: u8,
    /// Gas concentration, ppm.
    pub gas_ppm: u32,
    /// Radio signal strength, percent.
    pub signal: u8,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            battery: 85,
            gas_ppm: 50,
            signal: 78,
        }
    }
}

impl SensorReadings {
    pub fn battery_level(&self) -> SensorLevel {
        match self.battery {
            0..=19 => SensorLevel::Critical,
            20..=39 => SensorLevel::Warning,
            _ => SensorLevel::Normal,
        }
    }

    pub fn gas_level(&self) -> SensorLevel {
        if self.gas_ppm > 300 {
            SensorLevel::Critical
        } else if self.gas_ppm > 200 {
            SensorLevel::Warning
        } else {
            SensorLevel::Normal
        }
    }

    pub fn signal_level(&self) -> SensorLevel {
        match self.signal {
            0..=29 => SensorLevel::Critical,
            30..=49 => SensorLevel::Warning,
            _ => SensorLevel::Normal,
        }
    }
}

/// Serializable snapshot of everything the operator display shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub vehicle: String,
    pub power_on: bool,
    pub link: ConnectionStatus,
    pub controller: ControllerKind,
    pub last_action: Option<Direction>,
    pub sensors: SensorReadings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_levels() {
        let mut sensors = SensorReadings::default();
        assert_eq!(sensors.battery_level(), SensorLevel::Normal);
        sensors.battery = 39;
        assert_eq!(sensors.battery_level(), SensorLevel::Warning);
        sensors.battery = 19;
        assert_eq!(sensors.battery_level(), SensorLevel::Critical);
    }

    #[test]
    fn test_gas_levels() {
        let mut sensors = SensorReadings::default();
        sensors.gas_ppm = 200;
        assert_eq!(sensors.gas_level(), SensorLevel::Normal);
        sensors.gas_ppm = 201;
        assert_eq!(sensors.gas_level(), SensorLevel::Warning);
        sensors.gas_ppm = 301;
        assert_eq!(sensors.gas_level(), SensorLevel::Critical);
    }

    #[test]
    fn test_signal_levels() {
        let mut sensors = SensorReadings::default();
        sensors.signal = 50;
        assert_eq!(sensors.signal_level(), SensorLevel::Normal);
        sensors.signal = 49;
        assert_eq!(sensors.signal_level(), SensorLevel::Warning);
        sensors.signal = 29;
        assert_eq!(sensors.signal_level(), SensorLevel::Critical);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Connecting.to_string(), "connecting");
        assert_eq!(ControllerKind::Sliders.to_string(), "sliders");
        assert_eq!("joystick".parse(), Ok(ControllerKind::Joystick));
    }
}
