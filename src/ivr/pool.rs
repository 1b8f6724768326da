//! Bounded worker pool for queued tasks
//!
//! Each worker unit pulls one task, runs it to completion through the task
//! registry, then takes the next. Task failures are logged and counted; they
//! never stop a worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::core::config::CourierConfig;
use crate::core::errors::{CourierError, Result};

use super::task::{Task, TaskRegistry};

/// Sending half of the task queue
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<Task>,
    capacity: usize,
}

impl TaskQueue {
    /// Queue a task, waiting for room if the queue is full
    pub async fn push(&self, task: Task) -> Result<()> {
        self.tx
            .send(task)
            .await
            .map_err(|_| CourierError::QueueClosed)
    }

    /// Queue a task without waiting
    pub fn try_push(&self, task: Task) -> Result<()> {
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CourierError::QueueFull {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => CourierError::QueueClosed,
        })
    }
}

/// Counters shared by all worker units
#[derive(Debug, Default)]
pub struct PoolStats {
    pub tasks_completed: AtomicU64,
    pub tasks_failed: AtomicU64,
}

impl PoolStats {
    pub fn completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.tasks_failed.load(Ordering::Relaxed)
    }
}

/// A fixed number of worker units sharing one task queue
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Spawn `config.workers` units and return the queue feeding them
    pub fn start(config: &CourierConfig, registry: Arc<TaskRegistry>) -> Result<(Self, TaskQueue)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(PoolStats::default());

        info!(workers = config.workers, queue_capacity = config.queue_capacity, "starting worker pool");

        let handles = (0..config.workers)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    rx.clone(),
                    registry.clone(),
                    shutdown_rx.clone(),
                    stats.clone(),
                ))
            })
            .collect();

        let queue = TaskQueue {
            tx,
            capacity: config.queue_capacity,
        };
        Ok((
            Self {
                handles,
                shutdown_tx,
                stats,
            },
            queue,
        ))
    }

    pub fn stats(&self) -> &Arc<PoolStats> {
        &self.stats
    }

    /// Stop taking new tasks and wait for in-flight tasks to finish
    pub async fn shutdown(self) {
        info!("worker pool shutting down");
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker unit panicked");
            }
        }
        info!("worker pool shutdown complete");
    }
}

async fn run_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Task>>>,
    registry: Arc<TaskRegistry>,
    mut shutdown_rx: watch::Receiver<bool>,
    stats: Arc<PoolStats>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let next = tokio::select! {
            _ = shutdown_rx.changed() => None,
            task = async { rx.lock().await.recv().await } => task,
        };

        // queue closed or shutdown requested
        let Some(task) = next else { break };

        debug!(worker_id, task_type = %task.task_type, org_id = %task.org_id, "starting task");
        match registry.dispatch(&task).await {
            Ok(()) => {
                stats.tasks_completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                stats.tasks_failed.fetch_add(1, Ordering::Relaxed);
                error!(worker_id, error = %e, task_type = %task.task_type, "error running task");
            }
        }
    }

    debug!(worker_id, "worker unit stopped");
}
