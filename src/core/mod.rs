// Infrastructure shared by the commit pipeline and the ivr worker

pub mod config;
pub mod errors;
pub mod telemetry;

// Re-export commonly used types
pub use config::{CourierConfig, CourierConfigBuilder};
pub use errors::{CourierError, Result, ResultExt};
pub use telemetry::init_tracing;
