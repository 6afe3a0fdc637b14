pub mod config;
pub mod services;
pub mod session;
pub mod telemetry;

// Re-export the engine for convenient access from the driver and tests
pub use session::engine::CallEngine;
