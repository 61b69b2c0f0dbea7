// frontend/src/app.rs
//
// Router shell: the live dashboard plus the configuration screen.

use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, Router};

use crate::telemetry_dashboard::config_tab::ConfigTab;
use crate::telemetry_dashboard::{TelemetryDashboard, use_link_supervisor};

// --- global css ---
const GLOBAL_CSS: &str = r#"
html, body {
    margin: 0;
    padding: 0;
    width: 100%;
    min-height: 100%;
    background: #020617;
    font-family: system-ui, sans-serif;
}

:root, html {
    color-scheme: dark;
}

#main {
    width: 100%;
    min-height: 100%;
    background: #020617;
}

* { box-sizing: border-box; }

.nav-link {
    color: #93c5fd;
    text-decoration: none;
    font-weight: 600;
}

.chart-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(420px, 1fr));
    gap: 12px;
}
"#;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[layout(Shell)]
    #[route("/")]
    Dashboard {},

    #[route("/configuration")]
    Configuration {},
}

#[component]
pub fn App() -> Element {
    rsx! {
        document::Style { "{GLOBAL_CSS}" }
        Meta { name: "viewport", content: "width=device-width, initial-scale=1" }

        div {
            style: "min-height: 100vh; width: 100%; background: #020617; color: #e5e7eb;",
            Router::<Route> {}
        }
    }
}

#[component]
fn Shell() -> Element {
    use_link_supervisor();

    rsx! {
        nav {
            style: "display:flex; gap:16px; align-items:center; padding:10px 16px; border-bottom:1px solid #1f2937; background:#0b1220;",
            span { style: "font-weight:800; color:#e5e7eb; margin-right:12px;", "UGV Telemetry" }
            Link { to: Route::Dashboard {}, class: "nav-link", "Dashboard" }
            Link { to: Route::Configuration {}, class: "nav-link", "Configuration" }
        }
        Outlet::<Route> {}
    }
}

#[component]
pub fn Dashboard() -> Element {
    rsx! { TelemetryDashboard {} }
}

#[component]
pub fn Configuration() -> Element {
    rsx! { ConfigTab {} }
}
