use std::collections::VecDeque;

use serde::Serialize;

use super::event::{OpsEvent, Severity};
use crate::session::event::CallOutcome;

/// The numbers behind the clinic dashboard cards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpsSnapshot {
    pub calls_started: u64,
    pub calls_completed: u64,
    pub calls_transferred: u64,
    pub calls_voicemail: u64,
    pub calls_failed: u64,
    pub reconnect_attempts: u64,
    pub emergencies_flagged: u64,
    pub phi_matches_scrubbed: u64,
    pub store_writes: u64,
    pub store_failures: u64,
    pub faults_low: u64,
    pub faults_medium: u64,
    pub faults_high: u64,
    pub faults_critical: u64,
    pub total_call_secs: u64,
    pub avg_call_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    Healthy,
    Watch,
    Degraded,
    Critical,
}

pub fn compute_snapshot(events: &VecDeque<OpsEvent>) -> OpsSnapshot {
    let mut snap = OpsSnapshot::default();
    let mut finished_calls = 0u64;

    for event in events {
        match event {
            OpsEvent::CallStarted => snap.calls_started += 1,
            OpsEvent::CallEnded {
                outcome,
                duration_secs,
            } => {
                match outcome {
                    CallOutcome::Completed => snap.calls_completed += 1,
                    CallOutcome::Transferred => snap.calls_transferred += 1,
                    CallOutcome::Voicemail => snap.calls_voicemail += 1,
                    CallOutcome::Failed => snap.calls_failed += 1,
                }
                snap.total_call_secs += duration_secs;
                finished_calls += 1;
            }
            OpsEvent::Reconnect { .. } => snap.reconnect_attempts += 1,
            OpsEvent::EmergencyFlagged { .. } => snap.emergencies_flagged += 1,
            OpsEvent::PhiScrubbed { matches } => snap.phi_matches_scrubbed += matches,
            OpsEvent::StoreWrite { ok } => {
                snap.store_writes += 1;
                if !ok {
                    snap.store_failures += 1;
                }
            }
            OpsEvent::Fault { severity, .. } => match severity {
                Severity::Low => snap.faults_low += 1,
                Severity::Medium => snap.faults_medium += 1,
                Severity::High => snap.faults_high += 1,
                Severity::Critical => snap.faults_critical += 1,
            },
        }
    }

    if finished_calls > 0 {
        snap.avg_call_secs = snap.total_call_secs as f64 / finished_calls as f64;
    }

    snap
}

/// Rough health heuristic over accumulated faults. Thresholds are the
/// original dashboard's, not an SLO.
pub fn health(snap: &OpsSnapshot) -> SystemHealth {
    if snap.faults_critical > 0 {
        SystemHealth::Critical
    } else if snap.faults_high > 2 {
        SystemHealth::Degraded
    } else if snap.faults_medium > 5 {
        SystemHealth::Watch
    } else {
        SystemHealth::Healthy
    }
}
