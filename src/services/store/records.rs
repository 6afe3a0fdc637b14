use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::services::recall::{RecallEntry, RecallStatus};
use crate::services::waitlist::{WaitlistEntry, WaitlistTier};
use crate::session::event::CallOutcome;

/// The store's record envelope. `id` and `createdTime` are assigned by the
/// service; they are absent on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub fields: T,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<DateTime<Utc>>,
}

impl<T> Record<T> {
    pub fn new(fields: T) -> Self {
        Self {
            id: None,
            fields,
            created_time: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordPage<T> {
    pub records: Vec<Record<T>>,
    #[serde(default)]
    #[allow(dead_code)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPreference {
    Call,
    Text,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatientFields {
    pub name: String,
    pub phone: String,
    #[serde(rename = "Contact Preference")]
    pub contact_preference: ContactPreference,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentPriority {
    Emergency,
    High,
    Normal,
}

/// Status transitions are not validated here; the store is the only
/// authority the original system had, and it has none either.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppointmentFields {
    pub patient: String,
    #[serde(rename = "Start")]
    pub starts_at: DateTime<Utc>,
    pub procedure: String,
    pub priority: AppointmentPriority,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WaitlistFields {
    #[serde(rename = "Patient Name")]
    pub patient_name: String,
    pub phone: String,
    pub tier: WaitlistTier,
    /// Comma-joined window keywords, the way the sheet stores them.
    #[serde(rename = "Preferred Windows")]
    pub preferred_windows: String,
    #[serde(rename = "Contact Attempts")]
    pub contact_attempts: u32,
    #[serde(rename = "Added At")]
    pub added_at: DateTime<Utc>,
}

impl From<&WaitlistEntry> for WaitlistFields {
    fn from(entry: &WaitlistEntry) -> Self {
        Self {
            patient_name: entry.patient_name.clone(),
            phone: entry.phone.clone(),
            tier: entry.tier,
            preferred_windows: entry.preferred_windows.join(", "),
            contact_attempts: entry.contact_attempts,
            added_at: entry.added_at,
        }
    }
}

impl WaitlistFields {
    pub fn into_entry(self) -> WaitlistEntry {
        WaitlistEntry {
            id: uuid::Uuid::new_v4(),
            patient_name: self.patient_name,
            phone: self.phone,
            tier: self.tier,
            preferred_windows: self
                .preferred_windows
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
            contact_attempts: self.contact_attempts,
            added_at: self.added_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecallFields {
    #[serde(rename = "Patient Name")]
    pub patient_name: String,
    pub phone: String,
    pub procedure: String,
    #[serde(rename = "Last Visit")]
    pub last_visit: NaiveDate,
    #[serde(rename = "Next Due")]
    pub next_due: NaiveDate,
    #[serde(rename = "Contact Attempts")]
    pub contact_attempts: u32,
    pub status: RecallStatus,
}

impl From<&RecallEntry> for RecallFields {
    fn from(entry: &RecallEntry) -> Self {
        Self {
            patient_name: entry.patient_name.clone(),
            phone: entry.phone.clone(),
            procedure: entry.procedure.clone(),
            last_visit: entry.last_visit,
            next_due: entry.next_due,
            contact_attempts: entry.contact_attempts,
            status: entry.status,
        }
    }
}

/// What gets persisted after a call: the transcript lands here only after
/// the scrubber has been over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallLogFields {
    #[serde(rename = "Session ID")]
    pub session_id: String,
    #[serde(rename = "Started At")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "Ended At")]
    pub ended_at: DateTime<Utc>,
    pub transcript: String,
    pub emergency: bool,
    pub urgency: u8,
    #[serde(rename = "PHI Matches")]
    pub phi_matches: u64,
    pub outcome: CallOutcome,
}
