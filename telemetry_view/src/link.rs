// Socket link state machine + reconnect backoff.
//
// The link never touches chart data. It only answers "are we connected",
// "when did the last good message land" and "how long until the next retry".

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ViewError, ViewResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
    /// Last transport failure reason.
    Error(String),
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Disconnected => "Disconnected",
            LinkState::Connected => "Connected",
            LinkState::Error(_) => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Opened,
    Closed,
    Failed(String),
}

/// Everything a socket session reports, on web or native.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened,
    Text(String),
    Closed,
    Failed(String),
}

impl SessionEvent {
    pub fn link_event(&self) -> Option<LinkEvent> {
        match self {
            SessionEvent::Opened => Some(LinkEvent::Opened),
            SessionEvent::Closed => Some(LinkEvent::Closed),
            SessionEvent::Failed(reason) => Some(LinkEvent::Failed(reason.clone())),
            SessionEvent::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Retries after the first failure; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 800,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (0-based), or `None` once the
    /// attempt budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts
            && attempt >= max
        {
            return None;
        }
        let factor = self.multiplier.max(1.0).powi(attempt.min(64) as i32);
        let ms = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Some(Duration::from_millis(ms.round() as u64))
    }

    pub fn validate(&self) -> ViewResult<()> {
        if self.initial_delay_ms == 0 {
            return Err(ViewError::InvalidConfig(
                "reconnect.initial_delay_ms must be positive".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ViewError::InvalidConfig(format!(
                "reconnect.multiplier must be >= 1, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    state: LinkState,
    last_message_ms: Option<i64>,
    retry_attempt: u32,
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl Link {
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            last_message_ms: None,
            retry_attempt: 0,
        }
    }

    pub fn state(&self) -> &LinkState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn last_message_ms(&self) -> Option<i64> {
        self.last_message_ms
    }

    pub fn apply(&mut self, event: LinkEvent) -> &LinkState {
        let next = match (&self.state, event) {
            (_, LinkEvent::Opened) => {
                self.reset_retries();
                LinkState::Connected
            }
            // the close that follows an error keeps the error visible
            (LinkState::Error(reason), LinkEvent::Closed) => LinkState::Error(reason.clone()),
            (_, LinkEvent::Closed) => LinkState::Disconnected,
            (_, LinkEvent::Failed(reason)) => LinkState::Error(reason),
        };

        if next != self.state {
            match &next {
                LinkState::Error(reason) => warn!(reason = %reason, "[WS] link error"),
                other => info!(from = self.state.as_str(), to = other.as_str(), "[WS] link state"),
            }
            self.state = next;
        }
        &self.state
    }

    pub fn record_message(&mut self, now_ms: i64) {
        self.last_message_ms = Some(now_ms);
    }

    /// Connected, but nothing has arrived within `stale_after_ms`.
    pub fn is_stale(&self, now_ms: i64, stale_after_ms: u64) -> bool {
        if !self.is_connected() {
            return false;
        }
        match self.last_message_ms {
            Some(last) => {
                now_ms.saturating_sub(last) > i64::try_from(stale_after_ms).unwrap_or(i64::MAX)
            }
            None => true,
        }
    }

    pub fn reset_retries(&mut self) {
        self.retry_attempt = 0;
    }

    /// Consumes one retry from `policy`.
    pub fn next_retry(&mut self, policy: &ReconnectPolicy) -> Option<Duration> {
        let delay = policy.delay_for(self.retry_attempt)?;
        self.retry_attempt = self.retry_attempt.saturating_add(1);
        Some(delay)
    }
}
