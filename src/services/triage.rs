use serde::{Deserialize, Serialize};

/// Phrases that mark a call as a dental emergency. Matching is
/// case-insensitive substring, no negation handling: "no pain" still
/// matches "pain".
const EMERGENCY_KEYWORDS: &[&str] = &[
    "emergency",
    "knocked out",
    "knocked-out",
    "broken tooth",
    "cracked tooth",
    "chipped tooth",
    "bleeding",
    "swelling",
    "swollen",
    "abscess",
    "severe pain",
    "unbearable",
    "can't sleep",
    "cannot sleep",
    "trauma",
    "accident",
    "infection",
    "fever",
];

// The three pain vocabularies are disjoint on purpose. First hit wins,
// checked from severe down.
const SEVERE_PAIN: &[&str] = &["unbearable", "excruciating", "severe", "worst pain", "agony"];
const MODERATE_PAIN: &[&str] = &["throbbing", "aching", "constant pain", "really hurts"];
const MILD_PAIN: &[&str] = &["sensitive", "dull", "slight", "tender", "sore"];

const EMERGENCY_BASE_SCORE: u32 = 20;
const KEYWORD_SCORE: u32 = 15;
const PAIN_SCORE_WEIGHT: u32 = 5;

/// How soon the caller should be seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitWindow {
    WithinTwoHours,
    WithinSixHours,
    WithinTwentyFourHours,
}

impl WaitWindow {
    pub fn hours(&self) -> u32 {
        match self {
            WaitWindow::WithinTwoHours => 2,
            WaitWindow::WithinSixHours => 6,
            WaitWindow::WithinTwentyFourHours => 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub is_emergency: bool,
    /// 0, 3, 6 or 9.
    pub pain_level: u8,
    /// Clamped to [0, 100].
    pub urgency: u8,
    pub wait_window: WaitWindow,
    pub matched_keywords: Vec<String>,
}

pub struct EmergencyTriage;

impl EmergencyTriage {
    /// Score a single caller utterance. Pure keyword arithmetic; malformed
    /// or empty input degrades to a non-emergency assessment.
    pub fn assess(utterance: &str) -> TriageAssessment {
        let text = utterance.to_lowercase();

        let matched_keywords: Vec<String> = EMERGENCY_KEYWORDS
            .iter()
            .filter(|k| text.contains(*k))
            .map(|k| k.to_string())
            .collect();
        let is_emergency = !matched_keywords.is_empty();

        let pain_level = if SEVERE_PAIN.iter().any(|k| text.contains(k)) {
            9
        } else if MODERATE_PAIN.iter().any(|k| text.contains(k)) {
            6
        } else if MILD_PAIN.iter().any(|k| text.contains(k)) {
            3
        } else {
            0
        };

        let mut score = matched_keywords.len() as u32 * KEYWORD_SCORE
            + u32::from(pain_level) * PAIN_SCORE_WEIGHT;
        if is_emergency {
            score += EMERGENCY_BASE_SCORE;
        }
        let urgency = score.min(100) as u8;

        let wait_window = if urgency >= 80 {
            WaitWindow::WithinTwoHours
        } else if urgency >= 50 {
            WaitWindow::WithinSixHours
        } else {
            WaitWindow::WithinTwentyFourHours
        };

        TriageAssessment {
            is_emergency,
            pain_level,
            urgency,
            wait_window,
            matched_keywords,
        }
    }
}
