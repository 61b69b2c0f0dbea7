use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

/// Drive-tuning endpoint on the telemetry host.
pub const DRIVE_CONFIG_PATH: &str = "/config";

/// Body of `POST /config`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    pub max_speed: f64,
    pub turn_speed: f64,
}

impl DriveConfig {
    pub fn new(max_speed: f64, turn_speed: f64) -> ViewResult<Self> {
        for (name, v) in [("max_speed", max_speed), ("turn_speed", turn_speed)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ViewError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(Self {
            max_speed,
            turn_speed,
        })
    }

    /// Parse the two text inputs of the configuration form.
    pub fn parse_form(max_speed: &str, turn_speed: &str) -> ViewResult<Self> {
        let parse = |name: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| ViewError::InvalidConfig(format!("{name}: {raw:?} is not a number")))
        };
        Self::new(
            parse("max_speed", max_speed)?,
            parse("turn_speed", turn_speed)?,
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "max_speed": self.max_speed,
            "turn_speed": self.turn_speed,
        })
        .to_string()
    }
}
