pub mod recall;
pub mod redaction;
pub mod store;
pub mod triage;
pub mod waitlist;
