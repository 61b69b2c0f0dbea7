use crate::snapshot::{FaultCode, Motor, Snapshot};

/// VESC `mc_fault_code` descriptions, indexed by code.
pub const FAULT_DESCRIPTIONS: [&str; 16] = [
    "No Fault",
    "Over Voltage",
    "Under Voltage",
    "DRV8302 Error",
    "ABS Over Current",
    "Over Temp FET",
    "Over Temp Motor",
    "Over Temp Gate Driver",
    "Under Voltage Cutoff",
    "Over Voltage Cutoff",
    "High Offset Current Sensor 1",
    "High Offset Current Sensor 2",
    "High Offset Current Sensor 3",
    "Phase 1 Error",
    "Phase 2 Error",
    "Phase 3 Error",
];

pub const UNKNOWN_FAULT: &str = "Unknown Fault Code";

pub fn fault_description(code: &FaultCode) -> Option<&'static str> {
    let FaultCode::Code(code) = code else {
        return None;
    };
    usize::try_from(*code)
        .ok()
        .and_then(|i| FAULT_DESCRIPTIONS.get(i).copied())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultStatus {
    pub motor: Motor,
    pub code: FaultCode,
}

impl FaultStatus {
    pub fn is_ok(&self) -> bool {
        self.code.is_nominal()
    }

    /// One entry per motor; a missing code counts as nominal.
    pub fn from_snapshot(snapshot: &Snapshot) -> [FaultStatus; 4] {
        Motor::ALL.map(|motor| FaultStatus {
            motor,
            code: snapshot.fault_code(motor),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Ok,
    Fault,
}

impl BadgeTone {
    pub fn class(self) -> &'static str {
        match self {
            BadgeTone::Ok => "bg-success",
            BadgeTone::Fault => "bg-danger",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            BadgeTone::Ok => "#15803d",
            BadgeTone::Fault => "#b91c1c",
        }
    }
}

/// Render model of one fault card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultBadge {
    pub motor: &'static str,
    pub tone: BadgeTone,
    pub headline: String,
    pub detail: Option<&'static str>,
}

impl From<&FaultStatus> for FaultBadge {
    fn from(status: &FaultStatus) -> Self {
        let motor = status.motor.label();
        if status.is_ok() {
            return FaultBadge {
                motor,
                tone: BadgeTone::Ok,
                headline: "OK".to_string(),
                detail: None,
            };
        }
        FaultBadge {
            motor,
            tone: BadgeTone::Fault,
            headline: format!("FAULT ({})", status.code),
            detail: Some(fault_description(&status.code).unwrap_or(UNKNOWN_FAULT)),
        }
    }
}

/// Whole-panel replacement: one badge per motor, in input order.
pub fn render_fault_panel(statuses: &[FaultStatus]) -> Vec<FaultBadge> {
    statuses.iter().map(FaultBadge::from).collect()
}
