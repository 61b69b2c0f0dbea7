// frontend/src/telemetry_dashboard/mod.rs

macro_rules! log {
    ($($t:tt)*) => {{
        let s = format!($($t)*);
        crate::telemetry_dashboard::log(&s);
    }}
}

pub mod chart;
pub mod config_tab;
mod fault_panel;
mod readout_panel;

use chart::LineChart;
use fault_panel::FaultPanel;
use readout_panel::ReadoutPanel;

use dioxus::prelude::*;
use dioxus_signals::Signal;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use ugv_telemetry_view::drive::{DRIVE_CONFIG_PATH, DriveConfig};
use ugv_telemetry_view::endpoint::{http_url, normalize_base_url, socket_url};
use ugv_telemetry_view::frame::{VIEW_HEIGHT, VIEW_WIDTH};
use ugv_telemetry_view::time::now_ms;
use ugv_telemetry_view::{Dashboard, LinkState, SessionEvent, ViewConfig};

// unified storage keys
const BASE_URL_STORAGE_KEY: &str = "ugv_base_url";
const VIEW_CONFIG_STORAGE_KEY: &str = "ugv_view_config";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const STALE_TICK_MS: u64 = 1_000;

// ----------------------------
// Cross-platform persistence
//  - wasm32: localStorage
//  - native: JSON file in app data dir
// ----------------------------
mod persist {
    pub fn get_string(key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            let w = window()?;
            let ls = w.local_storage().ok()??;
            return ls.get_item(key).ok().flatten();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            native::get_string(key).ok().flatten()
        }
    }

    pub fn set_string(key: &str, value: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            let ls = window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            return ls
                .set_item(key, value)
                .map_err(|_| format!("failed to store {key}"));
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            native::set_string(key, value).map_err(|e| format!("failed to store {key}: {e}"))
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod native {
        use std::collections::HashMap;
        use std::io;

        fn storage_path() -> std::path::PathBuf {
            let mut base = dirs::data_local_dir()
                .or_else(dirs::data_dir)
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| ".".into()));
            base.push("ugv-telemetry");
            base.push("storage.json");
            base
        }

        fn load_map() -> Result<HashMap<String, String>, io::Error> {
            let path = storage_path();
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
                Err(e) => return Err(e),
            };

            let map = serde_json::from_slice::<HashMap<String, String>>(&bytes).unwrap_or_default();
            Ok(map)
        }

        fn save_map(map: &HashMap<String, String>) -> Result<(), io::Error> {
            let path = storage_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let bytes = serde_json::to_vec_pretty(map).unwrap_or_else(|_| b"{}".to_vec());
            std::fs::write(path, bytes)
        }

        pub fn get_string(key: &str) -> Result<Option<String>, io::Error> {
            let map = load_map()?;
            Ok(map.get(key).cloned())
        }

        pub fn set_string(key: &str, value: &str) -> Result<(), io::Error> {
            let mut map = load_map()?;
            map.insert(key.to_string(), value.to_string());
            save_map(&map)
        }
    }
}

// ---------- Base URL config ----------
pub struct UrlConfig;

impl UrlConfig {
    pub fn set_base_url_and_persist(url: &str) -> Result<(), String> {
        let clean = normalize_base_url(url);
        *BASE_URL.write() = clean.clone();
        persist::set_string(BASE_URL_STORAGE_KEY, &clean)
    }

    pub fn stored_base_url() -> Option<String> {
        persist::get_string(BASE_URL_STORAGE_KEY)
            .map(|s| normalize_base_url(&s))
            .filter(|s| !s.is_empty())
    }

    /// Stored base, else the page origin (web) or localhost (native).
    pub fn base_http() -> String {
        let base = UrlConfig::stored_base_url().unwrap_or_else(|| BASE_URL.peek().clone());
        if !base.is_empty() {
            return base;
        }

        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_else(|| "http://localhost:8080".to_string())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            DEFAULT_BASE_URL.to_string()
        }
    }

    pub fn socket_url() -> Result<String, String> {
        let path = DASHBOARD.peek().config().socket_path.clone();
        socket_url(&UrlConfig::base_http(), &path).map_err(|e| e.to_string())
    }

    pub fn http_url(path: &str) -> Result<String, String> {
        http_url(&UrlConfig::base_http(), path).map_err(|e| e.to_string())
    }
}

static BASE_URL: GlobalSignal<String> = Signal::global(String::new);

// ---------- View-model ----------
static DASHBOARD: GlobalSignal<Dashboard> = Signal::global(|| Dashboard::new(load_view_config()));

// When this number changes, we tear down and rebuild the websocket connection.
static WS_EPOCH: GlobalSignal<u64> = Signal::global(|| 0);
static WS_ALIVE: GlobalSignal<Arc<AtomicBool>> = Signal::global(|| Arc::new(AtomicBool::new(true)));

#[cfg(target_arch = "wasm32")]
static WS_RAW: GlobalSignal<Option<web_sys::WebSocket>> = Signal::global(|| None);

// Wall clock for the staleness check, ticked by the supervisor hook.
static NOW_MS: GlobalSignal<i64> = Signal::global(now_ms);

pub fn load_view_config() -> ViewConfig {
    let Some(raw) = persist::get_string(VIEW_CONFIG_STORAGE_KEY) else {
        return ViewConfig::default();
    };
    match ViewConfig::from_json(&raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            log!("[CFG] ignoring stored view config: {e}");
            ViewConfig::default()
        }
    }
}

/// Persist `cfg`, rebuild the view-model around it and restart the link.
pub fn apply_view_config(cfg: ViewConfig) -> Result<(), String> {
    cfg.validate().map_err(|e| e.to_string())?;
    let raw = serde_json::to_string(&cfg).map_err(|e| e.to_string())?;
    persist::set_string(VIEW_CONFIG_STORAGE_KEY, &raw)?;
    *DASHBOARD.write() = Dashboard::new(cfg);
    restart_link();
    Ok(())
}

pub fn current_view_config() -> ViewConfig {
    DASHBOARD.peek().config().clone()
}

/// Stop the current session (if any) and let the supervisor start a new one.
pub fn restart_link() {
    WS_ALIVE.peek().store(false, Ordering::Relaxed);
    *WS_ALIVE.write() = Arc::new(AtomicBool::new(true));

    #[cfg(target_arch = "wasm32")]
    {
        if let Some(ws) = WS_RAW.write().take() {
            let _ = ws.close();
        }
    }

    *WS_EPOCH.write() += 1;
}

/// Routes session events of one epoch into the view-model. Holds resolved
/// signals so socket callbacks can run outside a component scope.
#[derive(Clone, Copy)]
struct LinkSink {
    epoch: u64,
    current_epoch: Signal<u64>,
    dashboard: Signal<Dashboard>,
}

impl LinkSink {
    fn new(epoch: u64) -> Self {
        Self {
            epoch,
            current_epoch: WS_EPOCH.resolve(),
            dashboard: DASHBOARD.resolve(),
        }
    }

    fn is_current(&self) -> bool {
        *self.current_epoch.peek() == self.epoch
    }

    fn deliver(mut self, event: SessionEvent) {
        // late callbacks from a torn-down socket
        if !self.is_current() {
            return;
        }
        self.dashboard.write().handle_session(event, now_ms());
    }
}

/// Keeps one socket supervisor running per epoch and ticks the staleness clock.
/// Mounted once by the app shell so the link survives route changes.
pub fn use_link_supervisor() {
    let mut last_started_epoch = use_signal(|| None::<u64>);

    use_effect(move || {
        let epoch = *WS_EPOCH.read();
        if last_started_epoch.peek().as_ref() == Some(&epoch) {
            return;
        }
        last_started_epoch.set(Some(epoch));

        let alive = WS_ALIVE.peek().clone();
        let sink = LinkSink::new(epoch);
        log!("[WS] supervisor spawn (epoch={epoch})");
        spawn(async move {
            if let Err(e) = connect_ws_supervisor(sink, alive).await {
                log!("[WS] supervisor ended: {e}");
            }
        });
    });

    use_future(move || async move {
        loop {
            sleep_ms(STALE_TICK_MS).await;
            *NOW_MS.write() = now_ms();
        }
    });
}

#[component]
pub fn TelemetryDashboard() -> Element {
    let (frames, badges, readout, last_update, link_state, stale, dropped) = {
        let dash = DASHBOARD.read();
        let view = dash.view();
        (
            view.frames(VIEW_WIDTH, VIEW_HEIGHT),
            view.faults().to_vec(),
            view.readout().cloned(),
            view.last_update()
                .map(|u| u.text())
                .unwrap_or_else(|| "Last Update: --".to_string()),
            dash.link().state().clone(),
            dash.is_stale(*NOW_MS.read()),
            view.dropped(),
        )
    };

    let (link_text, link_color) = match &link_state {
        LinkState::Connected => ("Connected".to_string(), "#22c55e"),
        LinkState::Disconnected => ("Disconnected".to_string(), "#94a3b8"),
        LinkState::Error(reason) => (format!("Error: {reason}"), "#ef4444"),
    };

    let button_style = "
        padding:0.3rem 0.75rem;
        border-radius:0.5rem;
        border:1px solid #4b5563;
        background:#020617;
        color:#e5e7eb;
        cursor:pointer;
    ";

    rsx! {
        div {
            id: "telemetry",
            style: "display:flex; flex-direction:column; gap:12px; padding:12px;",

            div { style: "display:flex; gap:12px; align-items:center; flex-wrap:wrap;",
                span { style: "color:{link_color}; font-weight:700;", "{link_text}" }
                if stale {
                    span { style: "color:#facc15; font-weight:700;", "STALE" }
                }
                span { id: "lastUpdate", style: "color:#cbd5e1;", "{last_update}" }
                if dropped > 0 {
                    span { style: "color:#fca5a5; font-size:0.8rem;", "{dropped} dropped message(s)" }
                }
                div { style: "margin-left:auto; display:flex; gap:8px;",
                    button {
                        style: "{button_style}",
                        onclick: move |_| {
                            log!("[UI] reconnect requested");
                            restart_link();
                        },
                        "Reconnect"
                    }
                    button {
                        style: "{button_style}",
                        onclick: move |_| DASHBOARD.write().reset(),
                        "Clear"
                    }
                }
            }

            FaultPanel { badges: badges }

            div { class: "chart-grid",
                for frame in frames {
                    LineChart { key: "{frame.element_id}", frame: frame.clone() }
                }
            }

            ReadoutPanel { readout: readout }
        }
    }
}

// ---------- Web vs Native logging ----------
fn log(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&msg.into());

    #[cfg(not(target_arch = "wasm32"))]
    tracing::info!("{msg}");
}

async fn sleep_ms(ms: u64) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;

    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

// ---------- HTTP helpers ----------
pub async fn post_drive_config(cfg: DriveConfig) -> Result<(), String> {
    let url = UrlConfig::http_url(DRIVE_CONFIG_PATH)?;
    log!("[HTTP] POST {url} {}", cfg.to_json());
    let status = post_json(&url, &cfg).await?;
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(format!("server answered {status}"))
    }
}

#[cfg(target_arch = "wasm32")]
async fn post_json(url: &str, cfg: &DriveConfig) -> Result<u16, String> {
    use gloo_net::http::Request;

    let resp = Request::post(url)
        .header("Content-Type", "application/json")
        .body(cfg.to_json())
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    Ok(resp.status())
}

#[cfg(not(target_arch = "wasm32"))]
async fn post_json(url: &str, cfg: &DriveConfig) -> Result<u16, String> {
    let resp = reqwest::Client::new()
        .post(url)
        .json(cfg)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    Ok(resp.status().as_u16())
}

// ---------------------------------------------------------
// WebSocket supervisor: one session, then reconnect only if
// the view config carries a reconnect policy.
// ---------------------------------------------------------
async fn connect_ws_supervisor(sink: LinkSink, alive: Arc<AtomicBool>) -> Result<(), String> {
    let epoch = sink.epoch;
    let url = UrlConfig::socket_url()?;
    let policy = DASHBOARD.peek().config().reconnect.clone();

    #[cfg(not(target_arch = "wasm32"))]
    {
        let sessions = ugv_telemetry_view::ws::supervise(&url, policy.as_ref(), alive, |event| {
            sink.deliver(event)
        })
        .await;
        log!("[WS] supervisor done after {sessions} session(s) (epoch={epoch})");
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    {
        loop {
            if !alive.load(Ordering::Relaxed) || !sink.is_current() {
                break;
            }

            if let Err(e) = connect_ws_once_wasm(&url, sink, alive.clone()).await {
                log!("[WS] connect error: {e}");
            }

            if !alive.load(Ordering::Relaxed) || !sink.is_current() {
                break;
            }
            let Some(policy) = policy.as_ref() else {
                break;
            };
            let Some(delay) = DASHBOARD.write().link_mut().next_retry(policy) else {
                log!("[WS] giving up on reconnect (epoch={epoch})");
                break;
            };
            sleep_ms(delay.as_millis() as u64).await;
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
async fn connect_ws_once_wasm(
    url: &str,
    sink: LinkSink,
    alive: Arc<AtomicBool>,
) -> Result<(), String> {
    use futures_channel::oneshot;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

    let epoch = sink.epoch;
    log!("[WS] connecting to {url} (epoch={epoch})");

    let ws = WebSocket::new(url).map_err(|_| "failed to create websocket".to_string())?;
    *WS_RAW.write() = Some(ws.clone());

    let (closed_tx, closed_rx) = oneshot::channel::<()>();
    let closed_tx = std::rc::Rc::new(std::cell::RefCell::new(Some(closed_tx)));

    {
        let onopen: Closure<dyn FnMut(Event)> = Closure::new(move |_e: Event| {
            sink.deliver(SessionEvent::Opened);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let onmessage: Closure<dyn FnMut(MessageEvent)> = Closure::new(move |e: MessageEvent| {
            if let Some(s) = e.data().as_string() {
                sink.deliver(SessionEvent::Text(s));
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let closed_tx = closed_tx.clone();
        let onerror: Closure<dyn FnMut(ErrorEvent)> = Closure::new(move |e: ErrorEvent| {
            log!("[WS] error: {}", e.message());
            sink.deliver(SessionEvent::Failed("websocket error".to_string()));
            if let Some(tx) = closed_tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let closed_tx = closed_tx.clone();
        let onclose: Closure<dyn FnMut(CloseEvent)> = Closure::new(move |e: CloseEvent| {
            log!("[WS] close code={} reason='{}'", e.code(), e.reason());
            sink.deliver(SessionEvent::Closed);
            if let Some(tx) = closed_tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    futures_util::pin_mut!(closed_rx);

    loop {
        if !alive.load(Ordering::Relaxed) || !sink.is_current() {
            let _ = ws.close();
            break;
        }

        let done = futures_util::future::select(
            &mut closed_rx,
            gloo_timers::future::TimeoutFuture::new(150),
        )
        .await;

        match done {
            futures_util::future::Either::Left((_closed, _timeout)) => break,
            futures_util::future::Either::Right((_timeout, _closed)) => {}
        }
    }

    if sink.is_current() {
        *WS_RAW.write() = None;
    }

    Ok(())
}
