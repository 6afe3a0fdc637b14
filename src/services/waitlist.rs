use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_CONTACT_ATTEMPTS: u32 = 3;

/// Backfill priority. Emergencies jump the queue, new patients beat
/// established ones, ties go to whoever has waited longest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistTier {
    Emergency,
    NewPatient,
    Regular,
}

impl WaitlistTier {
    fn rank(&self) -> u8 {
        match self {
            WaitlistTier::Emergency => 0,
            WaitlistTier::NewPatient => 1,
            WaitlistTier::Regular => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub patient_name: String,
    pub phone: String,
    pub tier: WaitlistTier,
    /// Free-text window keywords ("morning", "friday"). Empty = any slot.
    pub preferred_windows: Vec<String>,
    pub contact_attempts: u32,
    pub added_at: DateTime<Utc>,
}

impl WaitlistEntry {
    pub fn new(
        patient_name: &str,
        phone: &str,
        tier: WaitlistTier,
        preferred_windows: &[&str],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_name: patient_name.to_string(),
            phone: phone.to_string(),
            tier,
            preferred_windows: preferred_windows.iter().map(|w| w.to_string()).collect(),
            contact_attempts: 0,
            added_at: Utc::now(),
        }
    }

    fn accepts(&self, slot_description: &str) -> bool {
        if self.preferred_windows.is_empty() {
            return true;
        }
        let slot = slot_description.to_lowercase();
        self.preferred_windows
            .iter()
            .any(|w| slot.contains(&w.to_lowercase()))
    }

    pub fn register_contact(&mut self) -> bool {
        if self.contact_attempts >= MAX_CONTACT_ATTEMPTS {
            return false;
        }
        self.contact_attempts += 1;
        true
    }
}

/// In-memory fill queue for cancelled slots. The durable copy lives in the
/// practice store; this holds whatever the driver has loaded.
#[derive(Debug, Default)]
pub struct WaitlistFiller {
    entries: Vec<WaitlistEntry>,
}

impl WaitlistFiller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: WaitlistEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick who gets a freed slot: highest tier first, earliest added_at on
    /// ties, first entry whose window keywords match the slot text. The
    /// winner is removed; that removal is the only double-booking guard.
    pub fn fill(&mut self, slot_description: &str) -> Option<WaitlistEntry> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| (self.entries[i].tier.rank(), self.entries[i].added_at));

        let winner = order
            .into_iter()
            .find(|&i| self.entries[i].accepts(slot_description))?;
        Some(self.entries.remove(winner))
    }
}
