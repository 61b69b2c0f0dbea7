//! View-model for the UGV motor telemetry dashboard.
//!
//! One inbound JSON snapshot covers the four drive motors (`rf`, `rb`, `lf`, `lb`).
//! [`Dashboard`] decodes it, appends one point per chart, refreshes the fault
//! panel and the drive readout, and tracks the socket link. Rendering is a
//! separate step: [`frame::build_frame`] and [`faults::render_fault_panel`]
//! produce plain data the UI maps onto markup.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod drive;
pub mod endpoint;
pub mod error;
pub mod faults;
pub mod frame;
pub mod link;
pub mod readout;
pub mod ring_buffer;
pub mod snapshot;
pub mod time;
pub mod view;

#[cfg(feature = "native")]
pub mod ws;

pub use chart::{Chart, ChartConfig, ChartKind, Quantity, Sample};
pub use config::{MissingFieldPolicy, ViewConfig};
pub use dashboard::Dashboard;
pub use error::{ViewError, ViewResult};
pub use faults::{FaultBadge, FaultStatus};
pub use link::{Link, LinkEvent, LinkState, ReconnectPolicy, SessionEvent};
pub use snapshot::{FaultCode, Motor, MotorData, Snapshot};
pub use view::TelemetryView;
