// config_tab.rs
//
// Connection target, view settings, and the drive-tuning form (POST /config).

use dioxus::prelude::*;
use ugv_telemetry_view::drive::DriveConfig;
use ugv_telemetry_view::MissingFieldPolicy;

use super::{UrlConfig, apply_view_config, current_view_config, post_drive_config, restart_link};

const CARD_STYLE: &str = "
    display:flex;
    flex-direction:column;
    gap:0.6rem;
    padding:1rem;
    border-radius:0.75rem;
    background:#020617ee;
    border:1px solid #4b5563;
";
const INPUT_STYLE: &str = "padding:8px; border-radius:8px; border:1px solid #334155; background:#020617; color:#e5e7eb;";
const BUTTON_STYLE: &str = "
    align-self:flex-start;
    padding:0.4rem 0.9rem;
    border-radius:0.5rem;
    border:1px solid #4b5563;
    background:#111827;
    color:#e5e7eb;
    cursor:pointer;
";

#[component]
pub fn ConfigTab() -> Element {
    rsx! {
        div { style: "display:flex; flex-direction:column; gap:12px; padding:12px; max-width:720px;",
            ConnectionCard {}
            ViewSettingsCard {}
            DriveConfigCard {}
        }
    }
}

#[component]
fn ConnectionCard() -> Element {
    let mut url_edit = use_signal(UrlConfig::base_http);
    let mut status = use_signal(String::new);

    rsx! {
        div { style: CARD_STYLE,
            h2 { style: "margin:0; color:#38bdf8; font-size:1rem;", "Telemetry Server" }
            input {
                style: INPUT_STYLE,
                value: "{url_edit}",
                oninput: move |evt| {
                    url_edit.set(evt.value());
                    status.set(String::new());
                },
            }
            button {
                style: BUTTON_STYLE,
                onclick: move |_| {
                    let raw = url_edit();
                    match UrlConfig::set_base_url_and_persist(&raw).and_then(|_| UrlConfig::socket_url()) {
                        Ok(ws_url) => {
                            restart_link();
                            status.set(format!("Connecting to {ws_url}"));
                        }
                        Err(e) => status.set(e),
                    }
                },
                "Save & Reconnect"
            }
            if !status().is_empty() {
                div { style: "color:#cbd5e1; font-size:0.85rem;", "{status}" }
            }
        }
    }
}

#[component]
fn ViewSettingsCard() -> Element {
    let initial = current_view_config();
    let mut history = use_signal(|| initial.history_points.to_string());
    let mut skip_missing =
        use_signal(|| initial.missing_fields == MissingFieldPolicy::SkipPoint);
    let mut reconnect = use_signal(|| initial.reconnect.is_some());
    let mut stale_ms = use_signal(|| {
        initial
            .stale_after_ms
            .map(|v| v.to_string())
            .unwrap_or_default()
    });
    let mut status = use_signal(String::new);

    let save = move |_: MouseEvent| {
        let result = current_view_config()
            .with_form(&history(), skip_missing(), reconnect(), &stale_ms())
            .map_err(|e| e.to_string())
            .and_then(apply_view_config);
        match result {
            Ok(()) => status.set("Saved; chart history was reset.".to_string()),
            Err(e) => status.set(e),
        }
    };

    rsx! {
        div { style: CARD_STYLE,
            h2 { style: "margin:0; color:#38bdf8; font-size:1rem;", "View" }
            label { style: "display:flex; flex-direction:column; gap:4px; color:#94a3b8; font-size:0.85rem;",
                "History points per chart"
                input {
                    style: INPUT_STYLE,
                    value: "{history}",
                    oninput: move |evt| history.set(evt.value()),
                }
            }
            label { style: "display:flex; flex-direction:column; gap:4px; color:#94a3b8; font-size:0.85rem;",
                "Stale after (ms, empty = off)"
                input {
                    style: INPUT_STYLE,
                    value: "{stale_ms}",
                    oninput: move |evt| stale_ms.set(evt.value()),
                }
            }
            label { style: "display:flex; gap:8px; align-items:center; color:#e5e7eb;",
                input {
                    r#type: "checkbox",
                    checked: skip_missing(),
                    onchange: move |evt| skip_missing.set(evt.checked()),
                }
                "Skip points with missing fields (instead of plotting 0)"
            }
            label { style: "display:flex; gap:8px; align-items:center; color:#e5e7eb;",
                input {
                    r#type: "checkbox",
                    checked: reconnect(),
                    onchange: move |evt| reconnect.set(evt.checked()),
                }
                "Reconnect automatically"
            }
            button { style: BUTTON_STYLE, onclick: save, "Apply" }
            if !status().is_empty() {
                div { style: "color:#cbd5e1; font-size:0.85rem;", "{status}" }
            }
        }
    }
}

#[component]
fn DriveConfigCard() -> Element {
    let mut max_speed = use_signal(String::new);
    let mut turn_speed = use_signal(String::new);
    let mut status = use_signal(String::new);
    let mut sending = use_signal(|| false);

    rsx! {
        div { style: CARD_STYLE,
            h2 { style: "margin:0; color:#38bdf8; font-size:1rem;", "Drive Configuration" }
            label { style: "display:flex; flex-direction:column; gap:4px; color:#94a3b8; font-size:0.85rem;",
                "Max speed"
                input {
                    style: INPUT_STYLE,
                    value: "{max_speed}",
                    oninput: move |evt| max_speed.set(evt.value()),
                }
            }
            label { style: "display:flex; flex-direction:column; gap:4px; color:#94a3b8; font-size:0.85rem;",
                "Turn speed"
                input {
                    style: INPUT_STYLE,
                    value: "{turn_speed}",
                    oninput: move |evt| turn_speed.set(evt.value()),
                }
            }
            button {
                style: BUTTON_STYLE,
                disabled: sending(),
                onclick: move |_| {
                    let cfg = match DriveConfig::parse_form(&max_speed(), &turn_speed()) {
                        Ok(cfg) => cfg,
                        Err(e) => {
                            status.set(e.to_string());
                            return;
                        }
                    };
                    sending.set(true);
                    status.set("Sending...".to_string());
                    spawn(async move {
                        let outcome = post_drive_config(cfg).await;
                        sending.set(false);
                        match outcome {
                            Ok(()) => status.set("Drive configuration applied.".to_string()),
                            Err(e) => {
                                log!("[HTTP] drive config failed: {e}");
                                status.set(format!("Failed: {e}"));
                            }
                        }
                    });
                },
                if sending() { "Sending..." } else { "Send" }
            }
            if !status().is_empty() {
                div { style: "color:#cbd5e1; font-size:0.85rem;", "{status}" }
            }
        }
    }
}
