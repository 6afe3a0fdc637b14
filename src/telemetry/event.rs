use serde::{Deserialize, Serialize};

use crate::session::event::CallOutcome;

// Allowed here: counts, durations, enums, severities.
// Forbidden: transcript text, names, numbers a caller spoke.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity picks the log level: low=debug, medium=info, high=warn,
    /// critical=error.
    pub fn log(&self, component: Component, message: &str) {
        match self {
            Severity::Low => tracing::debug!(?component, "{}", message),
            Severity::Medium => tracing::info!(?component, "{}", message),
            Severity::High => tracing::warn!(?component, "{}", message),
            Severity::Critical => tracing::error!(?component, "{}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Session,
    Store,
    Triage,
    Driver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OpsEvent {
    CallStarted,
    CallEnded {
        outcome: CallOutcome,
        duration_secs: u64,
    },
    Reconnect {
        attempt: u32,
    },
    EmergencyFlagged {
        urgency: u8,
    },
    PhiScrubbed {
        matches: u64,
    },
    StoreWrite {
        ok: bool,
    },
    Fault {
        component: Component,
        severity: Severity,
    },
}
