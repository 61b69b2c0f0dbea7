use tracing::{debug, warn};

use crate::chart::{Chart, Quantity, Sample};
use crate::config::{MissingFieldPolicy, ViewConfig};
use crate::error::ViewResult;
use crate::faults::{FaultBadge, FaultStatus, render_fault_panel};
use crate::frame::{ChartFrame, build_frame};
use crate::readout::DriveReadout;
use crate::snapshot::{Motor, Snapshot};
use crate::time::format_clock;

/// Minimal "last seen" readout; the full message is never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastUpdate {
    pub timestamp_ms: i64,
    pub clock: String,
}

impl LastUpdate {
    pub fn text(&self) -> String {
        format!("Last Update: {}", self.clock)
    }
}

/// Everything the dashboard shows, updated one snapshot at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryView {
    charts: Vec<Chart>,
    faults: Vec<FaultBadge>,
    last_update: Option<LastUpdate>,
    readout: Option<DriveReadout>,
    policy: MissingFieldPolicy,
    applied: u64,
    dropped: u64,
}

impl TelemetryView {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            charts: Quantity::ALL
                .iter()
                .map(|q| Chart::new(*q, config.history_points))
                .collect(),
            faults: Vec::new(),
            last_update: None,
            readout: None,
            policy: config.missing_fields,
            applied: 0,
            dropped: 0,
        }
    }

    /// Decode and apply one raw payload. A payload that fails to decode is
    /// counted and logged; the view is left untouched.
    pub fn apply_text(&mut self, raw: &str) -> ViewResult<()> {
        match Snapshot::decode(raw) {
            Ok(snapshot) => {
                self.apply(&snapshot);
                Ok(())
            }
            Err(e) => {
                self.dropped += 1;
                warn!(error = %e, "[WS] dropping telemetry message");
                Err(e)
            }
        }
    }

    pub fn apply(&mut self, snapshot: &Snapshot) {
        let t_ms = snapshot.timestamp_ms();
        self.last_update = Some(LastUpdate {
            timestamp_ms: t_ms,
            clock: format_clock(t_ms),
        });

        for chart_idx in 0..self.charts.len() {
            let quantity = Quantity::ALL[chart_idx];
            if let Some(sample) = self.sample_for(quantity, snapshot) {
                self.charts[chart_idx].append(t_ms, sample);
            }
        }

        self.faults = render_fault_panel(&FaultStatus::from_snapshot(snapshot));
        self.readout = Some(DriveReadout::from_snapshot(snapshot));
        self.applied += 1;
        debug!(timestamp_ms = t_ms, applied = self.applied, "snapshot applied");
    }

    fn sample_for(&self, quantity: Quantity, snapshot: &Snapshot) -> Option<Sample> {
        if quantity == Quantity::Throttle {
            return self.policy.resolve(snapshot.throttle).map(Sample::Single);
        }

        let mut values = [0.0; 4];
        for (slot, motor) in values.iter_mut().zip(Motor::ALL) {
            let reading = snapshot.motor(motor).and_then(|m| quantity.read(m));
            *slot = self.policy.resolve(reading)?;
        }
        Some(Sample::Multi(values))
    }

    pub fn chart(&self, quantity: Quantity) -> &Chart {
        let idx = Quantity::ALL
            .iter()
            .position(|q| *q == quantity)
            .unwrap_or_default();
        &self.charts[idx]
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn frames(&self, width: f64, height: f64) -> Vec<ChartFrame> {
        self.charts
            .iter()
            .map(|c| build_frame(c, width, height))
            .collect()
    }

    pub fn faults(&self) -> &[FaultBadge] {
        &self.faults
    }

    pub fn last_update(&self) -> Option<&LastUpdate> {
        self.last_update.as_ref()
    }

    pub fn readout(&self) -> Option<&DriveReadout> {
        self.readout.as_ref()
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::BadgeTone;

    const EXAMPLE: &str = r#"{"timestamp":1700000000,"throttle":0.5,"rf":{"v_in":48,"fault":0},"rb":{"v_in":47,"fault":1},"lf":{"v_in":46,"fault":0},"lb":{"v_in":45,"fault":0}}"#;

    fn latest(view: &TelemetryView, q: Quantity) -> Vec<f64> {
        view.chart(q)
            .datasets()
            .iter()
            .map(|d| *d.latest().expect("point present"))
            .collect()
    }

    #[test]
    fn end_to_end_example() {
        let mut view = TelemetryView::new(&ViewConfig::default());
        view.apply_text(EXAMPLE).expect("valid message");

        assert_eq!(latest(&view, Quantity::Voltage), vec![48.0, 47.0, 46.0, 45.0, 46.5]);
        assert_eq!(latest(&view, Quantity::Throttle), vec![0.5]);
        // absent fields zero-filled
        assert_eq!(latest(&view, Quantity::Rpm), vec![0.0; 5]);

        let faults: Vec<(&str, &str, Option<&str>)> = view
            .faults()
            .iter()
            .map(|b| (b.motor, b.headline.as_str(), b.detail))
            .collect();
        assert_eq!(
            faults,
            vec![
                ("RF", "OK", None),
                ("RB", "FAULT (1)", Some("Over Voltage")),
                ("LF", "OK", None),
                ("LB", "OK", None),
            ]
        );
        assert_eq!(view.faults()[1].tone, BadgeTone::Fault);

        let last = view.last_update().expect("readout set");
        assert_eq!(last.timestamp_ms, 1_700_000_000_000);
        assert!(last.text().starts_with("Last Update: "));
        assert_eq!(view.applied(), 1);
    }

    #[test]
    fn malformed_input_leaves_view_unchanged() {
        let mut view = TelemetryView::new(&ViewConfig::default());
        view.apply_text(EXAMPLE).expect("valid message");
        let before = view.clone();

        assert!(view.apply_text("not json").is_err());

        assert_eq!(view.charts(), before.charts());
        assert_eq!(view.faults(), before.faults());
        assert_eq!(view.last_update(), before.last_update());
        assert_eq!(view.dropped(), 1);
    }

    #[test]
    fn every_chart_stays_in_lockstep_under_the_window() {
        let mut view = TelemetryView::new(&ViewConfig::default());
        for i in 0..75 {
            let msg = format!(
                r#"{{"timestamp":{i},"throttle":{i},"rf":{{"erpm":{i}}},"lb":{{"temp_fet":30.5}}}}"#
            );
            view.apply_text(&msg).expect("valid message");
            for chart in view.charts() {
                assert!(chart.len() <= 60);
                for d in chart.datasets() {
                    assert_eq!(d.len(), chart.labels().len());
                }
            }
        }
        let rpm = view.chart(Quantity::Rpm);
        assert_eq!(rpm.labels().oldest(), Some(&15_000));
        assert_eq!(rpm.datasets()[0].oldest(), Some(&15.0));
    }

    #[test]
    fn skip_point_policy_omits_incomplete_charts() {
        let config = ViewConfig {
            missing_fields: MissingFieldPolicy::SkipPoint,
            ..ViewConfig::default()
        };
        let mut view = TelemetryView::new(&config);
        view.apply_text(EXAMPLE).expect("valid message");

        assert_eq!(view.chart(Quantity::Voltage).len(), 1);
        assert_eq!(view.chart(Quantity::Throttle).len(), 1);
        assert!(view.chart(Quantity::Rpm).is_empty());
        assert!(view.chart(Quantity::Temperature).is_empty());
        // the fault panel does not depend on the policy
        assert_eq!(view.faults().len(), 4);

        view.apply_text(r#"{"timestamp":1700000001}"#).expect("valid message");
        assert_eq!(view.chart(Quantity::Throttle).len(), 1);
    }

    #[test]
    fn far_out_timestamps_still_render() {
        let mut view = TelemetryView::new(&ViewConfig::default());
        view.apply_text(r#"{"timestamp":-1e300,"throttle":1}"#)
            .expect("valid message");
        view.apply_text(r#"{"timestamp":1700000000,"throttle":0.5}"#)
            .expect("valid message");

        let frames = view.frames(crate::frame::VIEW_WIDTH, crate::frame::VIEW_HEIGHT);
        let throttle = &frames[0];
        assert_eq!(throttle.series[0].points.split(' ').count(), 2);
        assert!(throttle.x_ticks.iter().all(|t| t.pos.is_finite()));
    }

    #[test]
    fn frames_cover_every_chart() {
        let mut view = TelemetryView::new(&ViewConfig::default());
        view.apply_text(EXAMPLE).expect("valid message");
        let frames = view.frames(crate::frame::VIEW_WIDTH, crate::frame::VIEW_HEIGHT);
        let ids: Vec<&str> = frames.iter().map(|f| f.element_id).collect();
        assert_eq!(
            ids,
            vec![
                "throttleChart",
                "voltageChart",
                "rpmChart",
                "dutyChart",
                "motorCurrentChart",
                "batteryCurrentChart",
                "tempChart",
            ]
        );
    }
}
