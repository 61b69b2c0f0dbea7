// frontend/src/telemetry_dashboard/chart.rs
//
// SVG line chart for one ChartFrame. All geometry comes precomputed from the
// core crate; this file only maps it onto markup.

use dioxus::prelude::*;
use ugv_telemetry_view::frame::{ChartFrame, SeriesPath, Tick};

const AXIS_COLOR: &str = "#334155";
const GRID_COLOR: &str = "#1f2937";
const TICK_TEXT_COLOR: &str = "#64748b";

#[component]
pub fn LineChart(frame: ChartFrame) -> Element {
    let view_box = format!("0 0 {} {}", frame.width, frame.height);
    let plot = frame.plot;
    let has_data = frame.series.iter().any(|s| !s.points.is_empty());
    let mid_x = (plot.left + plot.right) / 2.0;
    let mid_y = (plot.top + plot.bottom) / 2.0;

    rsx! {
        div { style: "padding:12px; border:1px solid #334155; border-radius:12px; background:#0b1220;",
            div { style: "color:#94a3b8; font-size:12px; margin-bottom:8px;", "{frame.title}" }

            div { style: "display:flex; flex-wrap:wrap; gap:10px; margin-bottom:6px;",
                for series in frame.series.iter() {
                    LegendEntry {
                        key: "{series.label}",
                        series: series.clone(),
                        box_width: frame.legend_box_width,
                        font_size: frame.legend_font_size,
                    }
                }
            }

            svg {
                id: "{frame.element_id}",
                view_box: "{view_box}",
                width: "100%",
                style: "display:block;",

                for tick in frame.y_ticks.iter() {
                    YTick { key: "y{tick.pos}", tick: tick.clone(), left: plot.left, right: plot.right }
                }
                for tick in frame.x_ticks.iter() {
                    XTick { key: "x{tick.pos}", tick: tick.clone(), bottom: plot.bottom }
                }

                line {
                    x1: "{plot.left}", y1: "{plot.top}",
                    x2: "{plot.left}", y2: "{plot.bottom}",
                    stroke: AXIS_COLOR,
                }
                line {
                    x1: "{plot.left}", y1: "{plot.bottom}",
                    x2: "{plot.right}", y2: "{plot.bottom}",
                    stroke: AXIS_COLOR,
                }

                for series in frame.series.iter() {
                    polyline {
                        key: "{series.label}",
                        points: "{series.points}",
                        fill: "none",
                        stroke: "{series.color}",
                        stroke_width: "{frame.line_width}",
                    }
                }

                if !has_data {
                    text {
                        x: "{mid_x}",
                        y: "{mid_y}",
                        fill: TICK_TEXT_COLOR,
                        font_size: "14",
                        text_anchor: "middle",
                        "Waiting for telemetry"
                    }
                }
            }
        }
    }
}

#[component]
fn LegendEntry(series: SeriesPath, box_width: u32, font_size: u32) -> Element {
    let latest = series
        .latest
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string());
    rsx! {
        span { style: "display:inline-flex; align-items:center; gap:4px; font-size:{font_size}px; color:#cbd5e1;",
            span { style: "display:inline-block; width:{box_width}px; height:{box_width}px; background:{series.color};" }
            "{series.label}"
            span { style: "color:#94a3b8;", "{latest}" }
        }
    }
}

#[component]
fn YTick(tick: Tick, left: f64, right: f64) -> Element {
    let label_x = left - 6.0;
    let label_y = tick.pos + 4.0;
    rsx! {
        line {
            x1: "{left}", y1: "{tick.pos}",
            x2: "{right}", y2: "{tick.pos}",
            stroke: GRID_COLOR,
            stroke_dasharray: "4 4",
        }
        text {
            x: "{label_x}", y: "{label_y}",
            fill: TICK_TEXT_COLOR,
            font_size: "12",
            text_anchor: "end",
            "{tick.label}"
        }
    }
}

#[component]
fn XTick(tick: Tick, bottom: f64) -> Element {
    let label_y = bottom + 18.0;
    rsx! {
        text {
            x: "{tick.pos}", y: "{label_y}",
            fill: TICK_TEXT_COLOR,
            font_size: "12",
            text_anchor: "middle",
            "{tick.label}"
        }
    }
}
