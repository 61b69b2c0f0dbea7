use tracing::info;

use crate::config::ViewConfig;
use crate::error::ViewResult;
use crate::link::{Link, LinkEvent, LinkState, SessionEvent};
use crate::view::TelemetryView;

/// Single owner of the view-model and the link. All socket traffic enters
/// through [`Dashboard::handle_session`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    config: ViewConfig,
    view: TelemetryView,
    link: Link,
}

impl Dashboard {
    pub fn new(config: ViewConfig) -> Self {
        let view = TelemetryView::new(&config);
        Self {
            config,
            view,
            link: Link::new(),
        }
    }

    pub fn handle_session(&mut self, event: SessionEvent, now_ms: i64) {
        match event {
            SessionEvent::Text(raw) => {
                // already logged by the view
                let _ = self.handle_text(&raw, now_ms);
            }
            other => {
                if let Some(link_event) = other.link_event() {
                    self.handle_link(link_event);
                }
            }
        }
    }

    pub fn handle_text(&mut self, raw: &str, now_ms: i64) -> ViewResult<()> {
        self.view.apply_text(raw)?;
        self.link.record_message(now_ms);
        Ok(())
    }

    pub fn handle_link(&mut self, event: LinkEvent) -> &LinkState {
        if event == LinkEvent::Opened {
            info!("[WS] open");
        }
        self.link.apply(event)
    }

    pub fn is_stale(&self, now_ms: i64) -> bool {
        self.config
            .stale_after_ms
            .is_some_and(|after| self.link.is_stale(now_ms, after))
    }

    /// Drop all chart history and start over with the same configuration.
    pub fn reset(&mut self) {
        self.view = TelemetryView::new(&self.config);
    }

    pub fn view(&self) -> &TelemetryView {
        &self.view
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
