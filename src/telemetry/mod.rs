pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{Component, OpsEvent, Severity};
pub use metrics::{OpsSnapshot, SystemHealth};
pub use recorder::TelemetryRecorder;
