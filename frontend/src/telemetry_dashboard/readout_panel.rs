// readout_panel.rs
use dioxus::prelude::*;
use ugv_telemetry_view::readout::{DriveReadout, MotorReadout};

#[component]
pub fn ReadoutPanel(readout: Option<DriveReadout>) -> Element {
    let Some(readout) = readout else {
        return rsx! {};
    };
    let summary = readout.summary_rows();
    let motors: Vec<(&'static str, MotorReadout)> = readout
        .motors
        .iter()
        .map(|m| (m.motor.key(), m.clone()))
        .collect();

    rsx! {
        div { style: "
                display:flex;
                flex-direction:column;
                gap:0.75rem;
                padding:1rem;
                border-radius:0.75rem;
                background:#020617ee;
                border:1px solid #4b5563;
            ",
            h2 { style: "margin:0; color:#38bdf8; font-size:1rem;", "Drive Readout" }
            div { style: "display:flex; gap:1.5rem; flex-wrap:wrap; color:#e5e7eb;",
                for (name, value) in summary {
                    span { key: "{name}",
                        span { style: "color:#94a3b8;", "{name}: " }
                        "{value}"
                    }
                }
            }
            div { style: "display:grid; grid-template-columns:repeat(auto-fill, minmax(220px, 1fr)); gap:10px;",
                for (key, motor) in motors {
                    MotorCard { key: "{key}", motor: motor }
                }
            }
        }
    }
}

#[component]
fn MotorCard(motor: MotorReadout) -> Element {
    let label = motor.motor.label();
    let rows = motor.rows();
    rsx! {
        div { style: "padding:0.6rem; border:1px solid #334155; border-radius:0.5rem; background:#0b1220;",
            div { style: "font-weight:700; color:#e5e7eb; margin-bottom:0.35rem;", "{label}" }
            table { style: "width:100%; font-size:0.8rem; border-collapse:collapse;",
                tbody {
                    for (name, value) in rows {
                        tr { key: "{name}",
                            td { style: "color:#94a3b8; padding:1px 4px;", "{name}" }
                            td { style: "color:#e5e7eb; padding:1px 4px; text-align:right;", "{value}" }
                        }
                    }
                }
            }
        }
    }
}
