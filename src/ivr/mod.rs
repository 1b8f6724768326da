//! IVR flow start batches
//!
//! A queued batch is decoded, filtered down to the contacts that may be
//! started and a call is requested for each. Worker units in a
//! [`WorkerPool`] take one batch at a time.

pub mod caller;
pub mod metrics;
pub mod pool;
pub mod task;
pub mod worker;

pub use caller::CallStarter;
pub use metrics::{BatchMetrics, MetricsSnapshot};
pub use pool::{PoolStats, TaskQueue, WorkerPool};
pub use task::{Task, TaskHandler, TaskRegistry, START_IVR_FLOW_BATCH};
pub use worker::{compute_exclusions, filter_contacts, BatchOutcome, FlowStartWorker};
