use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Months between visits, by procedure. Unknown procedures fall back to
/// the standard six-month recall.
const PROCEDURE_INTERVALS: &[(&str, u32)] = &[
    ("cleaning", 6),
    ("prophylaxis", 6),
    ("periodic exam", 6),
    ("comprehensive exam", 6),
    ("fluoride", 6),
    ("perio maintenance", 3),
    ("periodontal maintenance", 3),
    ("scaling and root planing", 3),
    ("bitewings", 12),
    ("radiographs", 12),
    ("full mouth series", 36),
];

const DEFAULT_INTERVAL_MONTHS: u32 = 6;

pub const MAX_CONTACT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallStatus {
    Due,
    Contacted,
    Scheduled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallEntry {
    pub patient_name: String,
    pub phone: String,
    pub procedure: String,
    pub last_visit: NaiveDate,
    pub next_due: NaiveDate,
    pub contact_attempts: u32,
    pub status: RecallStatus,
}

impl RecallEntry {
    pub fn new(patient_name: &str, phone: &str, procedure: &str, last_visit: NaiveDate) -> Self {
        Self {
            patient_name: patient_name.to_string(),
            phone: phone.to_string(),
            procedure: procedure.to_string(),
            last_visit,
            next_due: RecallScheduler::next_due(procedure, last_visit),
            contact_attempts: 0,
            status: RecallStatus::Due,
        }
    }

    /// Count one outreach attempt. Returns false once the entry is
    /// exhausted; exhausted entries stay Contacted and are left for a
    /// human to chase.
    pub fn register_contact(&mut self) -> bool {
        if self.contact_attempts >= MAX_CONTACT_ATTEMPTS {
            return false;
        }
        self.contact_attempts += 1;
        self.status = RecallStatus::Contacted;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.contact_attempts >= MAX_CONTACT_ATTEMPTS
    }
}

pub struct RecallScheduler;

impl RecallScheduler {
    /// Interval lookup: exact normalized key first, then a contains scan so
    /// "Adult Cleaning" still lands on "cleaning", then the default.
    pub fn interval_months(procedure: &str) -> u32 {
        let normalized = procedure.trim().to_lowercase();
        if let Some((_, months)) = PROCEDURE_INTERVALS.iter().find(|(k, _)| *k == normalized) {
            return *months;
        }
        if let Some((_, months)) = PROCEDURE_INTERVALS
            .iter()
            .find(|(k, _)| normalized.contains(k))
        {
            return *months;
        }
        DEFAULT_INTERVAL_MONTHS
    }

    /// Native calendar-month arithmetic, nothing cleverer. Month-end
    /// clamping is whatever chrono does.
    pub fn next_due(procedure: &str, last_visit: NaiveDate) -> NaiveDate {
        last_visit
            .checked_add_months(Months::new(Self::interval_months(procedure)))
            .unwrap_or(last_visit)
    }

    /// A due date in the past counts as due, silently.
    pub fn is_due(next_due: NaiveDate, today: NaiveDate) -> bool {
        next_due <= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cleaning_is_six_months_out() {
        assert_eq!(
            RecallScheduler::next_due("cleaning", date(2024, 2, 15)),
            date(2024, 8, 15)
        );
    }

    #[test]
    fn test_unknown_procedure_falls_back() {
        assert_eq!(RecallScheduler::interval_months("crown seat"), 6);
    }

    #[test]
    fn test_contains_match_on_free_text() {
        assert_eq!(RecallScheduler::interval_months("Adult Cleaning"), 6);
        assert_eq!(RecallScheduler::interval_months("Perio Maintenance visit"), 3);
    }

    #[test]
    fn test_month_end_clamps() {
        // Aug 31 + 3 months has no Nov 31.
        assert_eq!(
            RecallScheduler::next_due("perio maintenance", date(2024, 8, 31)),
            date(2024, 11, 30)
        );
    }

    #[test]
    fn test_past_due_date_is_due() {
        assert!(RecallScheduler::is_due(date(2023, 1, 1), date(2024, 6, 1)));
        assert!(!RecallScheduler::is_due(date(2024, 7, 1), date(2024, 6, 1)));
    }

    #[test]
    fn test_contact_attempts_cap() {
        let mut entry = RecallEntry::new("Pat", "555-0100", "cleaning", date(2024, 2, 15));
        assert!(entry.register_contact());
        assert!(entry.register_contact());
        assert!(entry.register_contact());
        assert!(!entry.register_contact());
        assert_eq!(entry.contact_attempts, 3);
        assert!(entry.is_exhausted());
        assert_eq!(entry.status, RecallStatus::Contacted);
    }
}
