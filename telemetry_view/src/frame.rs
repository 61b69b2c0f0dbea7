// Render model for one chart: SVG polyline strings in a fixed view box.
//
// The frontend maps a ChartFrame straight onto an <svg>; nothing here knows
// about the DOM. Y is anchored at zero, X spans the buffered time window.

use chrono::Local;

use crate::chart::{Chart, ChartKind};
use crate::time::format_clock_in;

pub const VIEW_WIDTH: f64 = 1020.0;
/// Matches the chart aspect ratio (1.7).
pub const VIEW_HEIGHT: f64 = 600.0;

const PAD_LEFT: f64 = 60.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 20.0;
const PAD_BOTTOM: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPath {
    pub label: &'static str,
    pub color: &'static str,
    /// `"x,y x,y ..."`, suitable for `<polyline points=... />`.
    pub points: String,
    pub latest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// X or Y position in view-box units, depending on the axis.
    pub pos: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub element_id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub width: f64,
    pub height: f64,
    pub plot: PlotArea,
    pub line_width: f64,
    pub legend_box_width: u32,
    pub legend_font_size: u32,
    pub series: Vec<SeriesPath>,
    pub y_min: f64,
    pub y_max: f64,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub revision: u64,
}

/// Local-time tick labels.
pub fn build_frame(chart: &Chart, width: f64, height: f64) -> ChartFrame {
    build_frame_with(chart, width, height, |t_ms, fmt| {
        format_clock_in(&Local, t_ms, fmt)
    })
}

pub fn build_frame_with<F>(chart: &Chart, width: f64, height: f64, fmt_time: F) -> ChartFrame
where
    F: Fn(i64, &str) -> String,
{
    let config = chart.config();
    let plot = PlotArea {
        left: PAD_LEFT,
        right: (width - PAD_RIGHT).max(PAD_LEFT + 1.0),
        top: PAD_TOP,
        bottom: (height - PAD_BOTTOM).max(PAD_TOP + 1.0),
    };

    let labels = chart.labels().to_vec();

    // y range over every finite value, anchored at zero
    let (mut y_min, mut y_max) = chart
        .datasets()
        .iter()
        .flat_map(|d| d.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), v| {
            (mn.min(v), mx.max(v))
        });
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if config.begin_at_zero {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }
    if (y_max - y_min).abs() < 1e-9 {
        y_max = y_min + 1.0;
    }

    // labels may arrive out of order; span math in i128 so clamped extremes
    // (i64::MIN next to i64::MAX) cannot overflow
    let t_min = labels.iter().copied().min().unwrap_or(0);
    let t_max = labels.iter().copied().max().unwrap_or(0);
    let t_span = (i128::from(t_max) - i128::from(t_min)).max(1);

    let map_x = |t: i64| {
        plot.left + ((i128::from(t) - i128::from(t_min)) as f64 / t_span as f64) * plot.width()
    };
    let map_y = |v: f64| plot.bottom - ((v - y_min) / (y_max - y_min)) * plot.height();

    let series = config
        .series
        .iter()
        .zip(chart.datasets())
        .map(|(style, data)| {
            let mut points = String::new();
            for (t, v) in labels.iter().zip(data.iter()) {
                if !v.is_finite() {
                    continue;
                }
                if !points.is_empty() {
                    points.push(' ');
                }
                points.push_str(&format!("{:.2},{:.2}", map_x(*t), map_y(*v)));
            }
            SeriesPath {
                label: style.label,
                color: style.color,
                points,
                latest: data.latest().copied(),
            }
        })
        .collect();

    let x_ticks = if labels.is_empty() {
        Vec::new()
    } else {
        let n = config.max_x_ticks.min(labels.len()).max(1);
        (0..n)
            .map(|i| {
                let t = if n == 1 {
                    t_max
                } else {
                    let offset = (t_span as f64 * i as f64 / (n - 1) as f64).round() as i128;
                    let t = (i128::from(t_min) + offset).clamp(i128::from(t_min), i128::from(t_max));
                    i64::try_from(t).unwrap_or(t_max)
                };
                Tick {
                    pos: map_x(t),
                    label: fmt_time(t, config.x_tick_format),
                }
            })
            .collect()
    };

    let y_mid = (y_min + y_max) * 0.5;
    let y_ticks = [y_max, y_mid, y_min]
        .into_iter()
        .map(|v| Tick {
            pos: map_y(v),
            label: format!("{v:.2}"),
        })
        .collect();

    ChartFrame {
        element_id: chart.element_id(),
        title: config.title,
        kind: config.kind,
        width,
        height,
        plot,
        line_width: config.line_width,
        legend_box_width: config.legend_box_width,
        legend_font_size: config.legend_font_size,
        series,
        y_min,
        y_max,
        x_ticks,
        y_ticks,
        revision: chart.revision(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Quantity, Sample};

    fn fmt_secs(t_ms: i64, _fmt: &str) -> String {
        format!("{}", t_ms / 1000)
    }

    #[test]
    fn empty_chart_has_no_paths() {
        let chart = Chart::new(Quantity::Voltage, 60);
        let frame = build_frame_with(&chart, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        assert_eq!(frame.series.len(), 5);
        assert!(frame.series.iter().all(|s| s.points.is_empty()));
        assert!(frame.x_ticks.is_empty());
        assert_eq!((frame.y_min, frame.y_max), (0.0, 1.0));
    }

    #[test]
    fn y_axis_is_anchored_at_zero() {
        let mut chart = Chart::new(Quantity::Voltage, 60);
        chart.append(0, Sample::Multi([48.0, 47.0, 46.0, 45.0]));
        chart.append(1_000, Sample::Multi([44.0, 47.0, 46.0, 45.0]));

        let frame = build_frame_with(&chart, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        assert_eq!(frame.y_min, 0.0);
        assert_eq!(frame.y_max, 48.0);

        // RF: two points, first at the left edge, second at the right edge
        let rf = &frame.series[0];
        assert_eq!(rf.points.split(' ').count(), 2);
        assert!(rf.points.starts_with(&format!("{:.2},", frame.plot.left)));
        assert_eq!(rf.latest, Some(44.0));
        assert_eq!(frame.series[4].latest, Some(45.5));
    }

    #[test]
    fn negative_values_extend_below_zero() {
        let mut chart = Chart::new(Quantity::BatteryCurrent, 60);
        chart.append(0, Sample::Multi([-5.0, 2.0, 1.0, 0.0]));
        let frame = build_frame_with(&chart, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        assert_eq!(frame.y_min, -5.0);
        assert_eq!(frame.y_max, 2.0);
    }

    #[test]
    fn x_ticks_are_capped() {
        let mut chart = Chart::new(Quantity::Throttle, 60);
        for i in 0..30 {
            chart.append(i * 1_000, Sample::Single(0.5));
        }
        let frame = build_frame_with(&chart, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        assert_eq!(frame.x_ticks.len(), 6);
        assert_eq!(frame.x_ticks.first().map(|t| t.label.as_str()), Some("0"));
        assert_eq!(frame.x_ticks.last().map(|t| t.label.as_str()), Some("29"));

        let mut short = Chart::new(Quantity::Throttle, 60);
        short.append(5_000, Sample::Single(1.0));
        let frame = build_frame_with(&short, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        assert_eq!(frame.x_ticks.len(), 1);
        assert_eq!(frame.x_ticks[0].label, "5");
    }

    fn x_coords(points: &str) -> Vec<f64> {
        points
            .split(' ')
            .filter_map(|p| p.split(',').next())
            .filter_map(|x| x.parse().ok())
            .collect()
    }

    #[test]
    fn extreme_timestamps_stay_on_the_plot() {
        let mut chart = Chart::new(Quantity::Throttle, 60);
        chart.append(i64::MIN, Sample::Single(1.0));
        chart.append(1_700_000_000_000, Sample::Single(0.5));
        chart.append(i64::MAX, Sample::Single(0.25));

        let frame = build_frame_with(&chart, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        let xs = x_coords(&frame.series[0].points);
        assert_eq!(xs.len(), 3);
        for x in xs.iter().chain(frame.x_ticks.iter().map(|t| &t.pos)) {
            assert!(x.is_finite());
            assert!(*x >= frame.plot.left - 0.01 && *x <= frame.plot.right + 0.01);
        }
    }

    #[test]
    fn out_of_order_labels_use_the_data_range() {
        let mut chart = Chart::new(Quantity::Throttle, 60);
        chart.append(10_000, Sample::Single(1.0));
        chart.append(20_000, Sample::Single(1.0));
        // publisher restarted with an earlier clock
        chart.append(2_000, Sample::Single(1.0));

        let frame = build_frame_with(&chart, VIEW_WIDTH, VIEW_HEIGHT, fmt_secs);
        let xs = x_coords(&frame.series[0].points);
        let left = format!("{:.2}", frame.plot.left);
        let right = format!("{:.2}", frame.plot.right);
        assert_eq!(format!("{:.2}", xs[1]), right);
        assert_eq!(format!("{:.2}", xs[2]), left);
        assert!(xs.iter().all(|x| *x >= frame.plot.left && *x <= frame.plot.right));
        assert_eq!(frame.x_ticks.first().map(|t| t.label.as_str()), Some("2"));
        assert_eq!(frame.x_ticks.last().map(|t| t.label.as_str()), Some("20"));
    }
}
