use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::redaction::PhiScrubber;
use crate::services::store::records::CallLogFields;
use crate::services::triage::{EmergencyTriage, TriageAssessment, WaitWindow};
use crate::telemetry::{Component, OpsEvent, Severity, TelemetryRecorder};

use super::event::{
    CallOutcome, SessionEvent, SessionStatus, TranscriptLine, TranscriptRole,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_reconnect_attempts: u32,
    pub reconnect_base_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 3,
            reconnect_base_delay: Duration::from_secs(2),
        }
    }
}

/// Work the driver has to carry out. The engine itself never awaits.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Tell the caller something, through the provider line.
    Speak { text: String, interrupt_assistant: bool },
    /// An emergency was flagged; surface it to the front desk.
    Escalate { urgency: u8, wait_window: WaitWindow },
    /// Persist the finished call. Transcript is already scrubbed.
    PersistCallLog(CallLogFields),
    /// Re-dial the line after the given delay.
    Reconnect { attempt: u32, delay: Duration },
}

/// State machine for one call. Events go in on the driver's cadence,
/// side effects come out; all I/O stays with the driver.
pub struct CallEngine {
    config: EngineConfig,
    status: SessionStatus,
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    transcript: Vec<TranscriptLine>,
    assessment: Option<TriageAssessment>,
    scrubbed_total: u64,
    reconnect_attempts: u32,
    caller_speaking: bool,
    log_written: bool,
    telemetry: TelemetryRecorder,
}

impl CallEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Idle,
            session_id: None,
            started_at: None,
            transcript: Vec::new(),
            assessment: None,
            scrubbed_total: 0,
            reconnect_attempts: 0,
            caller_speaking: false,
            log_written: false,
            telemetry: TelemetryRecorder::new(),
        }
    }

    /// Mark the engine as dialing. Idempotent; a live call ignores it.
    pub fn begin(&mut self) {
        if self.status == SessionStatus::Idle {
            self.status = SessionStatus::Connecting;
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    pub fn assessment(&self) -> Option<&TriageAssessment> {
        self.assessment.as_ref()
    }

    pub fn telemetry(&mut self) -> &mut TelemetryRecorder {
        &mut self.telemetry
    }

    pub fn snapshot(&self) -> crate::telemetry::OpsSnapshot {
        self.telemetry.snapshot()
    }

    /// Drain one cadence worth of events. MUST NOT await.
    pub fn tick_step(&mut self, events: Vec<SessionEvent>) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        for event in events {
            self.handle(event, &mut effects);
        }
        effects
    }

    fn handle(&mut self, event: SessionEvent, effects: &mut Vec<SideEffect>) {
        match event {
            SessionEvent::CallStarted { session_id } => {
                self.session_id = Some(session_id);
                self.status = SessionStatus::Active;
                // A start after a drop is a successful reconnect; the
                // attempt counter goes back to zero either way.
                self.reconnect_attempts = 0;
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now());
                    self.telemetry.record(OpsEvent::CallStarted);
                    info!(%session_id, "call started");
                } else {
                    info!(%session_id, "line re-established");
                }
            }

            SessionEvent::CallEnded { outcome } => {
                if matches!(self.status, SessionStatus::Ended | SessionStatus::Failed) {
                    return;
                }
                self.status = SessionStatus::Ended;
                self.finish(outcome, effects);
            }

            SessionEvent::SpeechStart { role } => {
                if role == TranscriptRole::Caller {
                    self.caller_speaking = true;
                }
            }

            SessionEvent::SpeechEnd { role } => {
                if role == TranscriptRole::Caller {
                    self.caller_speaking = false;
                }
            }

            SessionEvent::Transcript {
                role,
                text,
                is_final,
            } => {
                // Partials churn; only finals are triaged and retained.
                if !is_final {
                    return;
                }
                self.ingest_line(role, &text, effects);
            }

            SessionEvent::VolumeLevel(_) => {}

            SessionEvent::Error { message } => {
                warn!(error = %message, "session error");
                self.telemetry.record(OpsEvent::Fault {
                    component: Component::Session,
                    severity: Severity::High,
                });
                self.handle_drop(effects);
            }
        }
    }

    /// Triage runs on the raw utterance; only the scrubbed text is kept.
    fn ingest_line(&mut self, role: TranscriptRole, text: &str, effects: &mut Vec<SideEffect>) {
        if role == TranscriptRole::Caller {
            let assessment = EmergencyTriage::assess(text);
            if assessment.is_emergency && self.should_escalate(&assessment) {
                self.telemetry.record(OpsEvent::EmergencyFlagged {
                    urgency: assessment.urgency,
                });
                effects.push(SideEffect::Escalate {
                    urgency: assessment.urgency,
                    wait_window: assessment.wait_window,
                });
                effects.push(SideEffect::Speak {
                    text: format!(
                        "That sounds urgent. We can get you in within {} hours. \
                         Someone from the front desk will call you right back.",
                        assessment.wait_window.hours()
                    ),
                    interrupt_assistant: false,
                });
                self.assessment = Some(assessment);
            } else if assessment.is_emergency
                && assessment.urgency
                    > self.assessment.as_ref().map(|a| a.urgency).unwrap_or(0)
            {
                // Louder than what we already flagged; keep the worse one.
                self.assessment = Some(assessment);
            }
        }

        let outcome = PhiScrubber::scrub(text);
        if outcome.total_matches > 0 {
            self.scrubbed_total += outcome.total_matches as u64;
            self.telemetry.record(OpsEvent::PhiScrubbed {
                matches: outcome.total_matches as u64,
            });
        }
        self.transcript.push(TranscriptLine {
            role,
            text: outcome.text,
            at: Utc::now(),
        });
    }

    fn should_escalate(&self, _assessment: &TriageAssessment) -> bool {
        // Escalate once per call; later utterances only update the record.
        self.assessment.is_none()
    }

    fn handle_drop(&mut self, effects: &mut Vec<SideEffect>) {
        if !matches!(
            self.status,
            SessionStatus::Active | SessionStatus::Connecting
        ) {
            return;
        }

        let attempt = self.reconnect_attempts + 1;
        if attempt <= self.config.max_reconnect_attempts {
            self.reconnect_attempts = attempt;
            self.status = SessionStatus::Connecting;
            self.telemetry.record(OpsEvent::Reconnect { attempt });
            // Linear backoff: attempt n waits n * base.
            let delay = self.config.reconnect_base_delay * attempt;
            effects.push(SideEffect::Reconnect { attempt, delay });
        } else {
            self.status = SessionStatus::Failed;
            Severity::Critical.log(Component::Session, "reconnect attempts exhausted");
            self.telemetry.record(OpsEvent::Fault {
                component: Component::Session,
                severity: Severity::Critical,
            });
            self.finish(CallOutcome::Failed, effects);
        }
    }

    fn finish(&mut self, outcome: CallOutcome, effects: &mut Vec<SideEffect>) {
        if self.log_written {
            return;
        }
        self.log_written = true;

        let started_at = self.started_at.unwrap_or_else(Utc::now);
        let ended_at = Utc::now();
        let duration_secs = (ended_at - started_at).num_seconds().max(0) as u64;

        self.telemetry.record(OpsEvent::CallEnded {
            outcome,
            duration_secs,
        });

        let transcript = self
            .transcript
            .iter()
            .map(|line| {
                let who = match line.role {
                    TranscriptRole::Caller => "caller",
                    TranscriptRole::Assistant => "assistant",
                };
                format!("{}: {}", who, line.text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        effects.push(SideEffect::PersistCallLog(CallLogFields {
            session_id: self
                .session_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            started_at,
            ended_at,
            transcript,
            emergency: self
                .assessment
                .as_ref()
                .map(|a| a.is_emergency)
                .unwrap_or(false),
            urgency: self.assessment.as_ref().map(|a| a.urgency).unwrap_or(0),
            phi_matches: self.scrubbed_total,
            outcome,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(engine: &mut CallEngine) -> Vec<SideEffect> {
        engine.begin();
        engine.tick_step(vec![SessionEvent::CallStarted {
            session_id: Uuid::new_v4(),
        }])
    }

    fn caller(text: &str) -> SessionEvent {
        SessionEvent::Transcript {
            role: TranscriptRole::Caller,
            text: text.to_string(),
            is_final: true,
        }
    }

    #[test]
    fn test_emergency_escalates_once() {
        let mut engine = CallEngine::new(EngineConfig::default());
        started(&mut engine);

        let effects = engine.tick_step(vec![caller("I have severe pain, it's unbearable")]);
        assert!(effects
            .iter()
            .any(|e| matches!(e, SideEffect::Escalate { .. })));
        assert!(effects.iter().any(|e| matches!(e, SideEffect::Speak { .. })));

        // A second emergency line updates the record but stays quiet.
        let effects = engine.tick_step(vec![caller("and my tooth got knocked out")]);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, SideEffect::Escalate { .. })));
    }

    #[test]
    fn test_transcript_is_scrubbed_before_retention() {
        let mut engine = CallEngine::new(EngineConfig::default());
        started(&mut engine);
        engine.tick_step(vec![caller("my number is 555-123-4567")]);

        assert_eq!(engine.transcript().len(), 1);
        let line = &engine.transcript()[0];
        assert!(line.text.contains("[PHONE-REDACTED]"));
        assert!(!line.text.contains("555-123-4567"));
    }

    #[test]
    fn test_partials_are_dropped() {
        let mut engine = CallEngine::new(EngineConfig::default());
        started(&mut engine);
        engine.tick_step(vec![SessionEvent::Transcript {
            role: TranscriptRole::Caller,
            text: "my num".to_string(),
            is_final: false,
        }]);
        assert!(engine.transcript().is_empty());
    }

    #[test]
    fn test_call_end_persists_a_log() {
        let mut engine = CallEngine::new(EngineConfig::default());
        started(&mut engine);
        engine.tick_step(vec![caller("just booking a cleaning")]);

        let effects = engine.tick_step(vec![SessionEvent::CallEnded {
            outcome: CallOutcome::Completed,
        }]);
        let log = effects
            .iter()
            .find_map(|e| match e {
                SideEffect::PersistCallLog(log) => Some(log),
                _ => None,
            })
            .expect("call log effect");
        assert!(!log.emergency);
        assert!(log.transcript.contains("caller: just booking a cleaning"));
        assert_eq!(engine.status(), SessionStatus::Ended);
    }

    #[test]
    fn test_reconnect_backs_off_linearly() {
        let mut engine = CallEngine::new(EngineConfig {
            max_reconnect_attempts: 3,
            reconnect_base_delay: Duration::from_secs(2),
        });
        started(&mut engine);

        let effects = engine.tick_step(vec![SessionEvent::Error {
            message: "socket closed".to_string(),
        }]);
        match &effects[0] {
            SideEffect::Reconnect { attempt, delay } => {
                assert_eq!(*attempt, 1);
                assert_eq!(*delay, Duration::from_secs(2));
            }
            other => panic!("unexpected effect: {:?}", other),
        }

        let effects = engine.tick_step(vec![SessionEvent::Error {
            message: "still down".to_string(),
        }]);
        match &effects[0] {
            SideEffect::Reconnect { attempt, delay } => {
                assert_eq!(*attempt, 2);
                assert_eq!(*delay, Duration::from_secs(4));
            }
            other => panic!("unexpected effect: {:?}", other),
        }
    }

    #[test]
    fn test_reconnect_exhaustion_fails_the_call() {
        let mut engine = CallEngine::new(EngineConfig {
            max_reconnect_attempts: 2,
            reconnect_base_delay: Duration::from_millis(10),
        });
        started(&mut engine);

        for _ in 0..2 {
            engine.tick_step(vec![SessionEvent::Error {
                message: "drop".to_string(),
            }]);
        }
        let effects = engine.tick_step(vec![SessionEvent::Error {
            message: "gone for good".to_string(),
        }]);

        assert_eq!(engine.status(), SessionStatus::Failed);
        let log = effects
            .iter()
            .find_map(|e| match e {
                SideEffect::PersistCallLog(log) => Some(log),
                _ => None,
            })
            .expect("failed call still logs");
        assert_eq!(log.outcome, CallOutcome::Failed);
        assert_eq!(engine.snapshot().faults_critical, 1);
    }

    #[test]
    fn test_successful_reconnect_resets_the_counter() {
        let mut engine = CallEngine::new(EngineConfig {
            max_reconnect_attempts: 2,
            reconnect_base_delay: Duration::from_secs(1),
        });
        started(&mut engine);

        engine.tick_step(vec![SessionEvent::Error {
            message: "drop".to_string(),
        }]);
        engine.tick_step(vec![SessionEvent::CallStarted {
            session_id: Uuid::new_v4(),
        }]);

        // Fresh drop starts back at attempt 1.
        let effects = engine.tick_step(vec![SessionEvent::Error {
            message: "drop again".to_string(),
        }]);
        match &effects[0] {
            SideEffect::Reconnect { attempt, .. } => assert_eq!(*attempt, 1),
            other => panic!("unexpected effect: {:?}", other),
        }
    }

    #[test]
    fn test_errors_after_end_are_ignored() {
        let mut engine = CallEngine::new(EngineConfig::default());
        started(&mut engine);
        engine.tick_step(vec![SessionEvent::CallEnded {
            outcome: CallOutcome::Completed,
        }]);

        let effects = engine.tick_step(vec![SessionEvent::Error {
            message: "late error".to_string(),
        }]);
        assert!(effects.is_empty());
        assert_eq!(engine.status(), SessionStatus::Ended);
    }
}
