// fault_panel.rs
use dioxus::prelude::*;
use ugv_telemetry_view::faults::FaultBadge;

/// One card per motor, replaced wholesale on every message.
#[component]
pub fn FaultPanel(badges: Vec<FaultBadge>) -> Element {
    rsx! {
        div {
            id: "faultStatusPanel",
            style: "display:grid; grid-template-columns:repeat(auto-fill, minmax(180px, 1fr)); gap:10px;",
            if badges.is_empty() {
                div { style: "color:#64748b; font-size:0.85rem;", "No fault status yet" }
            }
            for badge in badges.iter() {
                FaultCard { key: "{badge.motor}", badge: badge.clone() }
            }
        }
    }
}

#[component]
fn FaultCard(badge: FaultBadge) -> Element {
    let class = badge.tone.class();
    let background = badge.tone.background();
    rsx! {
        div {
            class: "{class}",
            style: "padding:0.6rem 0.8rem; border-radius:0.75rem; background:{background}; color:#f8fafc;",
            div { style: "font-weight:800;", "{badge.motor}" }
            div { style: "font-size:0.9rem;", "{badge.headline}" }
            if let Some(detail) = badge.detail {
                div { style: "font-size:0.8rem; opacity:0.9;", "{detail}" }
            }
        }
    }
}
