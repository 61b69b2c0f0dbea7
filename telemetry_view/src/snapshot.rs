use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

use crate::error::{ViewError, ViewResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motor {
    RightFront,
    RightBack,
    LeftFront,
    LeftBack,
}

impl Motor {
    /// Series order used by every multi-motor chart and the fault panel.
    pub const ALL: [Motor; 4] = [
        Motor::RightFront,
        Motor::RightBack,
        Motor::LeftFront,
        Motor::LeftBack,
    ];

    /// Key of the motor's sub-record in the wire message.
    pub fn key(self) -> &'static str {
        match self {
            Motor::RightFront => "rf",
            Motor::RightBack => "rb",
            Motor::LeftFront => "lf",
            Motor::LeftBack => "lb",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Motor::RightFront => "RF",
            Motor::RightBack => "RB",
            Motor::LeftFront => "LF",
            Motor::LeftBack => "LB",
        }
    }
}

/// A present `fault` field. Integer codes index the VESC table; anything else
/// is kept verbatim so it still reads as a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultCode {
    Code(i64),
    Unrecognized(String),
}

impl FaultCode {
    pub const NONE: FaultCode = FaultCode::Code(0);

    pub fn is_nominal(&self) -> bool {
        *self == FaultCode::NONE
    }

    fn from_value(value: Value) -> Option<FaultCode> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(match n.as_i64() {
                Some(code) => FaultCode::Code(code),
                None => match n.as_f64() {
                    // 3.0 is still code 3
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => FaultCode::Code(f as i64),
                    _ => FaultCode::Unrecognized(n.to_string()),
                },
            }),
            other => Some(FaultCode::Unrecognized(other.to_string())),
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::Code(code) => write!(f, "{code}"),
            FaultCode::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// One motor controller's sub-record. Every field is optional on the wire;
/// wrong-typed values decode as `None` rather than failing the message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotorData {
    #[serde(deserialize_with = "lenient_f64")]
    pub v_in: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub erpm: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub duty: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub motor_current: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub battery_current: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub temp_fet: Option<f64>,
    #[serde(deserialize_with = "lenient_fault")]
    pub fault: Option<FaultCode>,

    // readout-only fields
    #[serde(deserialize_with = "lenient_f64")]
    pub motor_id_current: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub motor_iq: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub ah_draw: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub ah_charge: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub wh_draw: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub wh_charge: Option<f64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub tachometer: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub tachometer_abs: Option<i64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub pid_pos_now: Option<f64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub controller_id: Option<i64>,
}

/// One decoded telemetry message covering all four motors at one instant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    /// Unix seconds, fractional allowed.
    pub timestamp: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub throttle: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub steering: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub movement_state_forward_back: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_motor")]
    pub rf: Option<MotorData>,
    #[serde(default, deserialize_with = "lenient_motor")]
    pub rb: Option<MotorData>,
    #[serde(default, deserialize_with = "lenient_motor")]
    pub lf: Option<MotorData>,
    #[serde(default, deserialize_with = "lenient_motor")]
    pub lb: Option<MotorData>,
}

impl Snapshot {
    /// Decode one raw socket payload. Anything that is not a JSON object with a
    /// numeric `timestamp` is rejected.
    pub fn decode(raw: &str) -> ViewResult<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ViewError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(ViewError::Malformed("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| ViewError::Malformed(e.to_string()))
    }

    pub fn motor(&self, motor: Motor) -> Option<&MotorData> {
        match motor {
            Motor::RightFront => self.rf.as_ref(),
            Motor::RightBack => self.rb.as_ref(),
            Motor::LeftFront => self.lf.as_ref(),
            Motor::LeftBack => self.lb.as_ref(),
        }
    }

    pub fn timestamp_ms(&self) -> i64 {
        (self.timestamp * 1000.0).round() as i64
    }

    /// Fault code per motor; an absent (or null) code is nominal.
    pub fn fault_code(&self, motor: Motor) -> FaultCode {
        self.motor(motor)
            .and_then(|m| m.fault.clone())
            .unwrap_or(FaultCode::NONE)
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let Value::Number(n) = Value::deserialize(d)? else {
        return Ok(None);
    };
    Ok(n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    }))
}

fn lenient_fault<'de, D: Deserializer<'de>>(d: D) -> Result<Option<FaultCode>, D::Error> {
    Ok(FaultCode::from_value(Value::deserialize(d)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_motor<'de, D: Deserializer<'de>>(d: D) -> Result<Option<MotorData>, D::Error> {
    let value = Value::deserialize(d)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_partial_motor_records() {
        let snap = Snapshot::decode(
            r#"{"timestamp":1700000000.25,"throttle":0.5,"rf":{"v_in":48,"fault":0},"rb":{"v_in":47,"fault":1}}"#,
        )
        .expect("valid snapshot");

        assert_eq!(snap.timestamp_ms(), 1_700_000_000_250);
        assert_eq!(snap.throttle, Some(0.5));
        assert_eq!(snap.motor(Motor::RightFront).and_then(|m| m.v_in), Some(48.0));
        assert_eq!(snap.motor(Motor::RightFront).and_then(|m| m.erpm), None);
        assert!(snap.motor(Motor::LeftFront).is_none());
        assert_eq!(snap.fault_code(Motor::RightBack), FaultCode::Code(1));
        assert_eq!(snap.fault_code(Motor::LeftBack), FaultCode::NONE);
    }

    #[test]
    fn wrong_typed_fields_read_as_missing() {
        let snap = Snapshot::decode(
            r#"{"timestamp":1,"throttle":"fast","rf":{"v_in":"48","erpm":true},"rb":7,"source":42}"#,
        )
        .expect("still a snapshot");

        assert_eq!(snap.throttle, None);
        assert_eq!(snap.source, None);
        let rf = snap.motor(Motor::RightFront).expect("rf present");
        assert_eq!(rf.v_in, None);
        assert_eq!(rf.erpm, None);
        assert!(snap.rb.is_none());
    }

    #[test]
    fn non_integer_fault_codes_stay_faults() {
        let snap = Snapshot::decode(
            r#"{"timestamp":0,"rf":{"fault":"3"},"rb":{"fault":2.9},"lf":{"fault":4.0},"lb":{"fault":null}}"#,
        )
        .expect("valid snapshot");

        let rf = snap.fault_code(Motor::RightFront);
        assert_eq!(rf, FaultCode::Unrecognized("\"3\"".to_string()));
        assert!(!rf.is_nominal());
        assert_eq!(snap.fault_code(Motor::RightBack), FaultCode::Unrecognized("2.9".to_string()));
        assert_eq!(snap.fault_code(Motor::LeftFront), FaultCode::Code(4));
        assert!(snap.fault_code(Motor::LeftBack).is_nominal());
    }

    #[test]
    fn rejects_non_objects_and_missing_timestamp() {
        assert!(matches!(Snapshot::decode("not json"), Err(ViewError::Malformed(_))));
        assert!(matches!(Snapshot::decode("[1700000000]"), Err(ViewError::Malformed(_))));
        assert!(matches!(Snapshot::decode(r#"{"throttle":1}"#), Err(ViewError::Malformed(_))));
        assert!(matches!(
            Snapshot::decode(r#"{"timestamp":"now"}"#),
            Err(ViewError::Malformed(_))
        ));
    }

    #[test]
    fn keeps_readout_fields() {
        let snap = Snapshot::decode(
            r#"{"timestamp":5,"steering":-0.25,"movement_state_forward_back":"forward","source":"vesc",
                "lb":{"tachometer":1200,"tachometer_abs":1500,"ah_draw":0.75,"controller_id":3}}"#,
        )
        .expect("valid snapshot");

        assert_eq!(snap.steering, Some(-0.25));
        assert_eq!(snap.movement_state_forward_back.as_deref(), Some("forward"));
        let lb = snap.motor(Motor::LeftBack).expect("lb present");
        assert_eq!(lb.tachometer, Some(1200));
        assert_eq!(lb.tachometer_abs, Some(1500));
        assert_eq!(lb.ah_draw, Some(0.75));
        assert_eq!(lb.controller_id, Some(3));
    }
}
