// Native websocket session + supervisor (tokio-tungstenite).
//
// The session reports everything through a sink so the caller decides where
// the view-model lives (a UI signal, a test vector, ...).

use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{ViewError, ViewResult};
use crate::link::{Link, ReconnectPolicy, SessionEvent};

/// One connection: `Opened`, any number of `Text`, then `Closed` or `Failed`.
/// Binary and control frames are ignored. Returns once the peer closes, the
/// stream ends, or `alive` is cleared (checked between frames).
pub async fn run_session<F>(url: &str, alive: &AtomicBool, sink: &mut F) -> ViewResult<()>
where
    F: FnMut(SessionEvent),
{
    info!("[WS] connecting to {url}");

    let (mut stream, _) = match connect_async(url).await {
        Ok(ok) => ok,
        Err(e) => {
            let reason = format!("connect failed: {e}");
            sink(SessionEvent::Failed(reason.clone()));
            return Err(ViewError::Transport(reason));
        }
    };
    sink(SessionEvent::Opened);

    while alive.load(Ordering::Relaxed) {
        let Some(item) = stream.next().await else {
            break;
        };
        match item {
            Ok(Message::Text(text)) => sink(SessionEvent::Text(text.as_str().to_owned())),
            Ok(Message::Close(frame)) => {
                debug!(?frame, "[WS] close frame");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                let reason = format!("read error: {e}");
                sink(SessionEvent::Failed(reason.clone()));
                return Err(ViewError::Transport(reason));
            }
        }
    }

    sink(SessionEvent::Closed);
    Ok(())
}

/// Runs sessions until `alive` is cleared or the reconnect policy gives up.
/// With no policy this is exactly one session. Returns the number of
/// sessions attempted.
pub async fn supervise<F>(
    url: &str,
    policy: Option<&ReconnectPolicy>,
    alive: Arc<AtomicBool>,
    mut sink: F,
) -> u32
where
    F: FnMut(SessionEvent),
{
    let mut attempts: u32 = 0;
    // backoff bookkeeping only; the caller's sink owns the visible link state
    let mut backoff = Link::new();

    while alive.load(Ordering::Relaxed) {
        attempts += 1;
        let mut opened = false;
        let result = run_session(url, &alive, &mut |event: SessionEvent| {
            if event == SessionEvent::Opened {
                opened = true;
            }
            sink(event);
        })
        .await;

        if let Err(e) = result {
            warn!("[WS] session ended: {e}");
        }
        if opened {
            backoff.reset_retries();
        }

        let Some(policy) = policy else {
            break;
        };
        if !alive.load(Ordering::Relaxed) {
            break;
        }
        let Some(delay) = backoff.next_retry(policy) else {
            warn!(attempts, "[WS] giving up on reconnect");
            break;
        };
        info!(delay_ms = delay.as_millis() as u64, "[WS] reconnecting");
        tokio::time::sleep(delay).await;
    }

    attempts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Quantity;
    use crate::dashboard::Dashboard;
    use crate::link::LinkState;
    use futures_util::SinkExt;
    use tokio::net::TcpListener;

    /// Accepts one client, sends `frames`, then closes.
    async fn serve_once(frames: Vec<Message>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");
            for frame in frames {
                ws.send(frame).await.expect("send");
            }
            let _ = ws.close(None).await;
        });
        format!("ws://{addr}/ws")
    }

    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        format!("ws://{addr}/ws")
    }

    #[tokio::test]
    async fn session_reports_text_frames_in_order() {
        let url = serve_once(vec![
            Message::Text(r#"{"timestamp":1,"throttle":0.1}"#.to_string().into()),
            Message::Binary(vec![1u8, 2, 3].into()),
            Message::Text(r#"{"timestamp":2,"throttle":0.2}"#.to_string().into()),
        ])
        .await;

        let alive = AtomicBool::new(true);
        let mut events = Vec::new();
        run_session(&url, &alive, &mut |e| events.push(e))
            .await
            .expect("clean close");

        assert_eq!(
            events,
            vec![
                SessionEvent::Opened,
                SessionEvent::Text(r#"{"timestamp":1,"throttle":0.1}"#.to_string()),
                SessionEvent::Text(r#"{"timestamp":2,"throttle":0.2}"#.to_string()),
                SessionEvent::Closed,
            ]
        );
    }

    #[tokio::test]
    async fn supervised_session_feeds_the_dashboard() {
        let url = serve_once(vec![
            Message::Text(
                r#"{"timestamp":1700000000,"throttle":0.5,"rf":{"v_in":48},"rb":{"v_in":47},"lf":{"v_in":46},"lb":{"v_in":45}}"#
                    .to_string()
                    .into(),
            ),
            Message::Text("not json".to_string().into()),
        ])
        .await;

        let mut dash = Dashboard::default();
        let sessions = supervise(&url, None, Arc::new(AtomicBool::new(true)), |event| {
            dash.handle_session(event, 0)
        })
        .await;

        assert_eq!(sessions, 1);
        assert_eq!(dash.link().state(), &LinkState::Disconnected);
        assert_eq!(dash.view().chart(Quantity::Voltage).len(), 1);
        assert_eq!(dash.view().dropped(), 1);
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let url = closed_port_url().await;
        let alive = AtomicBool::new(true);
        let mut events = Vec::new();
        let result = run_session(&url, &alive, &mut |e| events.push(e)).await;

        assert!(matches!(result, Err(ViewError::Transport(_))));
        assert!(matches!(events.as_slice(), [SessionEvent::Failed(_)]));
    }

    #[tokio::test]
    async fn supervisor_retries_until_budget_is_spent() {
        let url = closed_port_url().await;
        let policy = ReconnectPolicy {
            initial_delay_ms: 1,
            max_delay_ms: 2,
            multiplier: 2.0,
            max_attempts: Some(2),
        };
        let mut failures = 0;
        let sessions = supervise(&url, Some(&policy), Arc::new(AtomicBool::new(true)), |e| {
            if matches!(e, SessionEvent::Failed(_)) {
                failures += 1;
            }
        })
        .await;

        assert_eq!(sessions, 3);
        assert_eq!(failures, 3);
    }

    #[tokio::test]
    async fn successful_open_refills_the_retry_budget() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            for _ in 0..2 {
                let (tcp, _) = listener.accept().await.expect("accept");
                let mut ws = tokio_tungstenite::accept_async(tcp).await.expect("handshake");
                let _ = ws.close(None).await;
            }
        });
        let policy = ReconnectPolicy {
            initial_delay_ms: 1,
            max_delay_ms: 2,
            multiplier: 2.0,
            max_attempts: Some(1),
        };

        let mut opened = 0;
        let sessions = supervise(
            &format!("ws://{addr}/ws"),
            Some(&policy),
            Arc::new(AtomicBool::new(true)),
            |e| {
                if e == SessionEvent::Opened {
                    opened += 1;
                }
            },
        )
        .await;

        // open, open, refused; each open resets the single-retry budget
        assert_eq!(opened, 2);
        assert_eq!(sessions, 3);
    }

    #[tokio::test]
    async fn cleared_alive_flag_stops_before_connecting() {
        let sessions = supervise(
            "ws://127.0.0.1:9/ws",
            Some(&ReconnectPolicy::default()),
            Arc::new(AtomicBool::new(false)),
            |_| {},
        )
        .await;
        assert_eq!(sessions, 0);
    }
}
