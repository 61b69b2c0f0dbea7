use tracing::warn;

use crate::ring_buffer::RingBuffer;
use crate::snapshot::{Motor, MotorData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Throttle,
    Voltage,
    Rpm,
    Duty,
    MotorCurrent,
    BatteryCurrent,
    Temperature,
}

impl Quantity {
    /// Render order.
    pub const ALL: [Quantity; 7] = [
        Quantity::Throttle,
        Quantity::Voltage,
        Quantity::Rpm,
        Quantity::Duty,
        Quantity::MotorCurrent,
        Quantity::BatteryCurrent,
        Quantity::Temperature,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Quantity::Throttle => "Throttle",
            Quantity::Voltage => "Voltage",
            Quantity::Rpm => "RPM",
            Quantity::Duty => "Duty Cycle",
            Quantity::MotorCurrent => "Motor Current",
            Quantity::BatteryCurrent => "Battery Current",
            Quantity::Temperature => "Temp FET",
        }
    }

    /// DOM id of the chart element.
    pub fn element_id(self) -> &'static str {
        match self {
            Quantity::Throttle => "throttleChart",
            Quantity::Voltage => "voltageChart",
            Quantity::Rpm => "rpmChart",
            Quantity::Duty => "dutyChart",
            Quantity::MotorCurrent => "motorCurrentChart",
            Quantity::BatteryCurrent => "batteryCurrentChart",
            Quantity::Temperature => "tempChart",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            Quantity::Throttle => ChartKind::Single,
            _ => ChartKind::Multi,
        }
    }

    /// Per-motor reading for multi-motor quantities. Throttle is a
    /// vehicle-level scalar and always reads `None` here.
    pub fn read(self, motor: &MotorData) -> Option<f64> {
        match self {
            Quantity::Throttle => None,
            Quantity::Voltage => motor.v_in,
            Quantity::Rpm => motor.erpm,
            Quantity::Duty => motor.duty,
            Quantity::MotorCurrent => motor.motor_current,
            Quantity::BatteryCurrent => motor.battery_current,
            Quantity::Temperature => motor.temp_fet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One line, one scalar per message.
    Single,
    /// One line per motor plus the cross-motor average.
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub label: &'static str,
    pub color: &'static str,
}

const AVERAGE_LABEL: &str = "Avg";

const MOTOR_COLORS: [&str; 5] = [
    "rgba(255, 99, 132, 1)",  // RF
    "rgba(54, 162, 235, 1)",  // RB
    "rgba(255, 206, 86, 1)",  // LF
    "rgba(75, 192, 192, 1)",  // LB
    "rgba(153, 102, 255, 1)", // Avg
];

const SINGLE_COLOR: &str = "rgba(75, 192, 192, 1)";

/// Static chart configuration. Built once per chart and never recomputed;
/// only the data buffers change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub title: &'static str,
    pub kind: ChartKind,
    pub series: Vec<SeriesStyle>,
    pub animated: bool,
    pub x_tick_format: &'static str,
    pub tooltip_format: &'static str,
    pub max_x_ticks: usize,
    pub begin_at_zero: bool,
    pub aspect_ratio: f64,
    pub line_width: f64,
    pub legend_box_width: u32,
    pub legend_font_size: u32,
}

impl ChartConfig {
    pub fn new(title: &'static str, kind: ChartKind) -> Self {
        let series = match kind {
            ChartKind::Multi => Motor::ALL
                .iter()
                .map(|m| m.label())
                .chain(std::iter::once(AVERAGE_LABEL))
                .zip(MOTOR_COLORS)
                .map(|(label, color)| SeriesStyle { label, color })
                .collect(),
            ChartKind::Single => vec![SeriesStyle {
                label: title,
                color: SINGLE_COLOR,
            }],
        };

        Self {
            title,
            kind,
            series,
            animated: false,
            x_tick_format: "%H:%M:%S",
            tooltip_format: "%H:%M:%S%.3f",
            max_x_ticks: 6,
            begin_at_zero: true,
            aspect_ratio: 1.7,
            line_width: 1.5,
            legend_box_width: 10,
            legend_font_size: 10,
        }
    }

    pub fn for_quantity(quantity: Quantity) -> Self {
        Self::new(quantity.title(), quantity.kind())
    }
}

/// Values for one append.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Single(f64),
    /// One value per motor, in [`Motor::ALL`] order.
    Multi([f64; 4]),
}

/// Arithmetic mean; an empty slice averages to 0.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Time-indexed chart with lockstep-bounded label and dataset buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    config: ChartConfig,
    element_id: &'static str,
    labels: RingBuffer<i64>,
    datasets: Vec<RingBuffer<f64>>,
    revision: u64,
}

impl Chart {
    pub fn new(quantity: Quantity, history_points: usize) -> Self {
        let config = ChartConfig::for_quantity(quantity);
        let datasets = config
            .series
            .iter()
            .map(|_| RingBuffer::new(history_points))
            .collect();
        Self {
            config,
            element_id: quantity.element_id(),
            labels: RingBuffer::new(history_points),
            datasets,
            revision: 0,
        }
    }

    /// Push one label and one value per dataset; evicts the oldest point of
    /// every buffer together once the window is full.
    pub fn append(&mut self, t_ms: i64, sample: Sample) -> bool {
        let row: Vec<f64> = match sample {
            Sample::Single(v) => vec![v],
            Sample::Multi(values) => {
                let avg = average(&values);
                values.into_iter().chain(std::iter::once(avg)).collect()
            }
        };

        if row.len() != self.datasets.len() {
            warn!(
                chart = self.config.title,
                expected = self.datasets.len(),
                got = row.len(),
                "sample shape does not match chart"
            );
            return false;
        }

        self.labels.push(t_ms);
        for (dataset, value) in self.datasets.iter_mut().zip(row) {
            dataset.push(value);
        }
        // Non-animated redraw marker for the render step.
        self.revision = self.revision.wrapping_add(1);
        true
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn element_id(&self) -> &'static str {
        self.element_id
    }

    pub fn labels(&self) -> &RingBuffer<i64> {
        &self.labels
    }

    pub fn datasets(&self) -> &[RingBuffer<f64>] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Bumped on every accepted append.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_lockstep(chart: &Chart, bound: usize) {
        for dataset in chart.datasets() {
            assert_eq!(dataset.len(), chart.labels().len());
        }
        assert!(chart.len() <= bound);
    }

    #[test]
    fn average_of_four_and_empty() {
        assert_eq!(average(&[48.0, 47.0, 46.0, 45.0]), 46.5);
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[-2.0, 2.0, 1.0, 3.0]), 1.0);
    }

    #[test]
    fn multi_chart_pushes_average_series() {
        let mut chart = Chart::new(Quantity::Voltage, 60);
        assert!(chart.append(1_000, Sample::Multi([48.0, 47.0, 46.0, 45.0])));

        let latest: Vec<f64> = chart
            .datasets()
            .iter()
            .map(|d| *d.latest().expect("one point"))
            .collect();
        assert_eq!(latest, vec![48.0, 47.0, 46.0, 45.0, 46.5]);
        assert_eq!(chart.labels().to_vec(), vec![1_000]);
        assert_eq!(chart.revision(), 1);
    }

    #[test]
    fn window_keeps_last_sixty_in_order() {
        let mut chart = Chart::new(Quantity::Rpm, 60);
        for i in 0..61 {
            let v = i as f64;
            chart.append(i * 1_000, Sample::Multi([v, v, v, v]));
            assert_lockstep(&chart, 60);
        }

        assert_eq!(chart.len(), 60);
        let labels = chart.labels().to_vec();
        assert_eq!(labels.first(), Some(&1_000));
        assert_eq!(labels.last(), Some(&60_000));
        assert!(!labels.contains(&0));
        let rf = chart.datasets()[0].to_vec();
        assert_eq!(rf, (1..61).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn shape_mismatch_is_rejected_without_mutation() {
        let mut single = Chart::new(Quantity::Throttle, 60);
        assert!(!single.append(0, Sample::Multi([1.0; 4])));
        assert!(single.is_empty());

        let mut multi = Chart::new(Quantity::Duty, 60);
        assert!(!multi.append(0, Sample::Single(0.3)));
        assert!(multi.is_empty());
        assert_eq!(multi.revision(), 0);
    }

    #[test]
    fn config_is_static_per_kind() {
        let throttle = ChartConfig::for_quantity(Quantity::Throttle);
        assert_eq!(throttle.kind, ChartKind::Single);
        assert_eq!(throttle.series.len(), 1);
        assert_eq!(throttle.series[0].label, "Throttle");

        let temp = ChartConfig::for_quantity(Quantity::Temperature);
        let labels: Vec<&str> = temp.series.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["RF", "RB", "LF", "LB", "Avg"]);
        assert!(!temp.animated);
        assert!(temp.begin_at_zero);
        assert_eq!(temp.max_x_ticks, 6);
    }
}
