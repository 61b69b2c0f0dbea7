use crate::snapshot::{Motor, MotorData, Snapshot};

const MISSING: &str = "-";

/// Latest-value panel for the fields that are not charted.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveReadout {
    pub steering: Option<f64>,
    pub movement: Option<String>,
    pub source: Option<String>,
    pub motors: [MotorReadout; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotorReadout {
    pub motor: Motor,
    pub data: MotorData,
}

impl DriveReadout {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            steering: snapshot.steering,
            movement: snapshot.movement_state_forward_back.clone(),
            source: snapshot.source.clone(),
            motors: Motor::ALL.map(|motor| MotorReadout {
                motor,
                data: snapshot.motor(motor).cloned().unwrap_or_default(),
            }),
        }
    }

    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Steering", fmt_f64(self.steering, 2)),
            ("Movement", self.movement.clone().unwrap_or_else(|| MISSING.to_string())),
            ("Source", self.source.clone().unwrap_or_else(|| MISSING.to_string())),
        ]
    }
}

impl MotorReadout {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let d = &self.data;
        vec![
            ("Controller", fmt_i64(d.controller_id)),
            ("Tachometer", fmt_i64(d.tachometer)),
            ("Tachometer (abs)", fmt_i64(d.tachometer_abs)),
            ("Ah drawn", fmt_f64(d.ah_draw, 3)),
            ("Ah charged", fmt_f64(d.ah_charge, 3)),
            ("Wh drawn", fmt_f64(d.wh_draw, 2)),
            ("Wh charged", fmt_f64(d.wh_charge, 2)),
            ("I d", fmt_f64(d.motor_id_current, 2)),
            ("I q", fmt_f64(d.motor_iq, 2)),
            ("PID pos", fmt_f64(d.pid_pos_now, 2)),
        ]
    }
}

fn fmt_f64(v: Option<f64>, precision: usize) -> String {
    v.map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| MISSING.to_string())
}

fn fmt_i64(v: Option<i64>) -> String {
    v.map(|v| v.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_render_as_dash() {
        let snap = Snapshot::decode(
            r#"{"timestamp":1,"steering":-0.25,"rf":{"controller_id":7,"ah_draw":1.5,"tachometer":-20}}"#,
        )
        .expect("valid");
        let readout = DriveReadout::from_snapshot(&snap);

        assert_eq!(
            readout.summary_rows(),
            vec![
                ("Steering", "-0.25".to_string()),
                ("Movement", "-".to_string()),
                ("Source", "-".to_string()),
            ]
        );

        let rf = readout.motors[0].rows();
        assert_eq!(rf[0], ("Controller", "7".to_string()));
        assert_eq!(rf[1], ("Tachometer", "-20".to_string()));
        assert_eq!(rf[3], ("Ah drawn", "1.500".to_string()));
        assert_eq!(rf[4], ("Ah charged", "-".to_string()));

        assert_eq!(readout.motors[3].motor, Motor::LeftBack);
        assert!(readout.motors[3].rows().iter().all(|(_, v)| v == "-"));
    }
}
