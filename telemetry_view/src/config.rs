use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};
use crate::link::ReconnectPolicy;

/// Points kept per chart series.
pub const DEFAULT_HISTORY_POINTS: usize = 60;
pub const DEFAULT_SOCKET_PATH: &str = "/ws";

/// What a chart does with a message that lacks one of its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Plot the missing value as 0.
    #[default]
    ZeroFill,
    /// Skip that chart's point for this message.
    SkipPoint,
}

impl MissingFieldPolicy {
    pub fn resolve(self, value: Option<f64>) -> Option<f64> {
        match (self, value) {
            (_, Some(v)) => Some(v),
            (MissingFieldPolicy::ZeroFill, None) => Some(0.0),
            (MissingFieldPolicy::SkipPoint, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub history_points: usize,
    pub missing_fields: MissingFieldPolicy,
    /// `None` keeps the link down after the first close or error.
    pub reconnect: Option<ReconnectPolicy>,
    /// Flag the view as stale when no message arrived for this long.
    pub stale_after_ms: Option<u64>,
    pub socket_path: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            history_points: DEFAULT_HISTORY_POINTS,
            missing_fields: MissingFieldPolicy::default(),
            reconnect: None,
            stale_after_ms: None,
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
        }
    }
}

impl ViewConfig {
    pub fn from_json(raw: &str) -> ViewResult<Self> {
        let cfg: ViewConfig = serde_json::from_str(raw)
            .map_err(|e| ViewError::InvalidConfig(format!("view config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ViewResult<()> {
        if self.history_points == 0 {
            return Err(ViewError::InvalidConfig(
                "history_points must be at least 1".to_string(),
            ));
        }
        if !self.socket_path.starts_with('/') {
            return Err(ViewError::InvalidConfig(format!(
                "socket_path must start with '/': {:?}",
                self.socket_path
            )));
        }
        if let Some(policy) = &self.reconnect {
            policy.validate()?;
        }
        Ok(())
    }

    /// Settings-form values applied on top of `self`. An existing reconnect
    /// policy survives the toggle; an empty stale field turns staleness off.
    pub fn with_form(
        &self,
        history: &str,
        skip_missing: bool,
        reconnect: bool,
        stale_ms: &str,
    ) -> ViewResult<Self> {
        let whole = |name: &str, raw: &str| {
            raw.trim().parse::<u64>().map_err(|_| {
                ViewError::InvalidConfig(format!("{name}: {raw:?} is not a whole number"))
            })
        };

        let mut cfg = self.clone();
        cfg.history_points = usize::try_from(whole("history points", history)?)
            .map_err(|_| ViewError::InvalidConfig(format!("history points: {history:?} is too large")))?;
        cfg.missing_fields = if skip_missing {
            MissingFieldPolicy::SkipPoint
        } else {
            MissingFieldPolicy::ZeroFill
        };
        cfg.reconnect = match (reconnect, cfg.reconnect.take()) {
            (false, _) => None,
            (true, Some(existing)) => Some(existing),
            (true, None) => Some(ReconnectPolicy::default()),
        };
        cfg.stale_after_ms = if stale_ms.trim().is_empty() {
            None
        } else {
            Some(whole("stale after", stale_ms)?)
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
