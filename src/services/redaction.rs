use once_cell::sync::Lazy;
use regex::Regex;

/// One redaction rule: a compiled pattern and the literal token that
/// replaces every match.
struct PhiRule {
    label: &'static str,
    placeholder: &'static str,
    pattern: Regex,
}

/// Rule order matters. SSNs and card numbers go before the phone rule so a
/// longer digit run is never half-eaten as a phone number.
static RULES: Lazy<Vec<PhiRule>> = Lazy::new(|| {
    vec![
        PhiRule {
            label: "ssn",
            placeholder: "[SSN-REDACTED]",
            pattern: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
        },
        PhiRule {
            label: "card",
            placeholder: "[CARD-REDACTED]",
            pattern: Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").unwrap(),
        },
        PhiRule {
            label: "phone",
            placeholder: "[PHONE-REDACTED]",
            pattern: Regex::new(r"(?:\+1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").unwrap(),
        },
        PhiRule {
            label: "email",
            placeholder: "[EMAIL-REDACTED]",
            pattern: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
        },
        PhiRule {
            label: "dob",
            placeholder: "[DOB-REDACTED]",
            pattern: Regex::new(r"\b(?:0?[1-9]|1[0-2])[/-](?:0?[1-9]|[12]\d|3[01])[/-](?:19|20)\d{2}\b")
                .unwrap(),
        },
        PhiRule {
            label: "mrn",
            placeholder: "[MRN-REDACTED]",
            pattern: Regex::new(r"(?i)\b(?:mrn|medical record(?: number)?|chart)\s*#?:?\s*\d{4,10}\b")
                .unwrap(),
        },
    ]
});

#[derive(Debug, Clone)]
pub struct ScrubOutcome {
    /// The input with every match replaced by its placeholder token.
    pub text: String,
    /// (rule label, match count), in rule order, zero-count rules included.
    pub matches_by_kind: Vec<(&'static str, usize)>,
    pub total_matches: usize,
}

impl ScrubOutcome {
    /// Ad hoc exposure heuristic: start at 100, dock 5 per match. This
    /// scores how much PHI was spoken on the call, not how well the
    /// patterns performed.
    pub fn compliance_score(&self) -> u8 {
        100u8.saturating_sub(self.total_matches.saturating_mul(5).min(100) as u8)
    }
}

pub struct PhiScrubber;

impl PhiScrubber {
    /// Pattern redaction, not verified de-identification. Formats outside
    /// the rule set pass through untouched.
    pub fn scrub(text: &str) -> ScrubOutcome {
        let mut scrubbed = text.to_string();
        let mut matches_by_kind = Vec::with_capacity(RULES.len());
        let mut total_matches = 0;

        for rule in RULES.iter() {
            let count = rule.pattern.find_iter(&scrubbed).count();
            if count > 0 {
                scrubbed = rule
                    .pattern
                    .replace_all(&scrubbed, rule.placeholder)
                    .into_owned();
            }
            matches_by_kind.push((rule.label, count));
            total_matches += count;
        }

        ScrubOutcome {
            text: scrubbed,
            matches_by_kind,
            total_matches,
        }
    }
}
