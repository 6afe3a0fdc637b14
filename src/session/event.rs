use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    Caller,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Completed,
    Transferred,
    Voicemail,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Active,
    Ended,
    Failed,
}

/// Provider session lifecycle, as the engine sees it. Whatever the vendor
/// wire format is, the line adapter reduces it to these.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    CallStarted {
        session_id: Uuid,
    },
    CallEnded {
        outcome: CallOutcome,
    },
    SpeechStart {
        role: TranscriptRole,
    },
    SpeechEnd {
        role: TranscriptRole,
    },
    Transcript {
        role: TranscriptRole,
        text: String,
        is_final: bool,
    },
    VolumeLevel(f32),
    Error {
        message: String,
    },
}

/// Commands flowing back toward the provider.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Say {
        text: String,
        interrupt_assistant: bool,
    },
    Mute(bool),
    HangUp,
}

/// One retained line of conversation. `text` has already been scrubbed by
/// the time it gets here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub role: TranscriptRole,
    pub text: String,
    pub at: DateTime<Utc>,
}
