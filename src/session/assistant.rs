use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

/// Provider-facing assistant configuration. Serialized camelCase because
/// that is what the vendor API eats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOptions {
    pub first_message: String,
    pub system_prompt: String,
    pub transcriber: TranscriberOptions,
    pub voice: VoiceOptions,
    pub model: ModelOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriberOptions {
    pub provider: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOptions {
    pub provider: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOptions {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            first_message: first_message(OfficeStatus::Open),
            system_prompt: "You are the front-desk assistant for a dental practice. \
                Be warm and brief. Collect the reason for the call, offer \
                appointment times, and flag anything that sounds urgent."
                .to_string(),
            transcriber: TranscriberOptions {
                provider: "deepgram".to_string(),
                model: "nova-2".to_string(),
                language: "en-US".to_string(),
            },
            voice: VoiceOptions {
                provider: "11labs".to_string(),
                voice_id: "rachel".to_string(),
            },
            model: ModelOptions {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeStatus {
    Open,
    Closed,
}

/// Front-desk hours: Mon-Thu 8-17, Fri 8-14, weekend closed.
pub fn office_status(now: &chrono::DateTime<chrono::Local>) -> OfficeStatus {
    let hour = now.hour();
    let open = match now.weekday() {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => (8..17).contains(&hour),
        Weekday::Fri => (8..14).contains(&hour),
        Weekday::Sat | Weekday::Sun => false,
    };
    if open {
        OfficeStatus::Open
    } else {
        OfficeStatus::Closed
    }
}

pub fn first_message(status: OfficeStatus) -> String {
    match status {
        OfficeStatus::Open => {
            "Thanks for calling Bright Smile Dental! How can I help you today?".to_string()
        }
        OfficeStatus::Closed => {
            "Thanks for calling Bright Smile Dental. The office is closed right now, \
             but I can help you book an appointment or take a message."
                .to_string()
        }
    }
}

impl AssistantOptions {
    pub fn for_status(status: OfficeStatus) -> Self {
        Self {
            first_message: first_message(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_weekday_hours() {
        // 2024-03-05 is a Tuesday.
        assert_eq!(office_status(&local(2024, 3, 5, 9)), OfficeStatus::Open);
        assert_eq!(office_status(&local(2024, 3, 5, 18)), OfficeStatus::Closed);
        assert_eq!(office_status(&local(2024, 3, 5, 7)), OfficeStatus::Closed);
    }

    #[test]
    fn test_friday_closes_early() {
        // 2024-03-08 is a Friday.
        assert_eq!(office_status(&local(2024, 3, 8, 13)), OfficeStatus::Open);
        assert_eq!(office_status(&local(2024, 3, 8, 15)), OfficeStatus::Closed);
    }

    #[test]
    fn test_weekend_is_closed() {
        // 2024-03-09 is a Saturday.
        assert_eq!(office_status(&local(2024, 3, 9, 10)), OfficeStatus::Closed);
    }

    #[test]
    fn test_closed_greeting_differs() {
        let open = AssistantOptions::for_status(OfficeStatus::Open);
        let closed = AssistantOptions::for_status(OfficeStatus::Closed);
        assert_ne!(open.first_message, closed.first_message);
        assert!(closed.first_message.contains("closed"));
    }

    #[test]
    fn test_options_serialize_camel_case() {
        let json = serde_json::to_value(AssistantOptions::default()).unwrap();
        assert!(json.get("firstMessage").is_some());
        assert!(json["voice"].get("voiceId").is_some());
    }
}
