//! Flow start batch worker
//!
//! Filters a batch down to the contacts that may be started, requests a
//! call for each of them and marks the start complete after its last batch.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::CourierConfig;
use crate::core::errors::{CourierError, Result, ResultExt};
use crate::models::{ContactId, Database, FlowStartBatch};

use super::caller::CallStarter;
use super::metrics::BatchMetrics;
use super::task::{Task, TaskHandler, START_IVR_FLOW_BATCH};

/// What happened to one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Contacts listed in the batch
    pub candidates: usize,
    /// Contacts dropped by the participation checks
    pub excluded: usize,
    /// Contacts a call start was requested for, in request order
    pub dispatched: Vec<ContactId>,
    /// Contacts whose call start failed
    pub failed: Vec<ContactId>,
    /// Whether the originating start was marked complete
    pub marked_complete: bool,
}

impl BatchOutcome {
    /// Number of calls requested successfully
    pub fn started(&self) -> usize {
        self.dispatched.len() - self.failed.len()
    }
}

/// Contacts of `batch` that must not be started.
///
/// Both checks run against the full candidate list and their results are
/// unioned, so the order they run in doesn't matter.
pub async fn compute_exclusions(
    db: &dyn Database,
    batch: &FlowStartBatch,
) -> Result<HashSet<ContactId>> {
    let mut exclude = HashSet::new();

    // anybody who has already been in this flow, unless restarting
    if !batch.restart_participants() {
        let started = db
            .find_flow_started_overlap(batch.flow_id(), batch.contact_ids())
            .await
            .with_context(|| format!("error finding others started flow: {}", batch.flow_id()))?;
        exclude.extend(started);
    }

    // anybody currently active in any flow, unless including them
    if !batch.include_active() {
        let active = db
            .find_active_run_overlap(batch.contact_ids())
            .await
            .with_context(|| format!("error finding other active flow: {}", batch.flow_id()))?;
        exclude.extend(active);
    }

    Ok(exclude)
}

/// Candidates not in `exclude`, in their original order
pub fn filter_contacts(candidates: &[ContactId], exclude: &HashSet<ContactId>) -> Vec<ContactId> {
    candidates
        .iter()
        .filter(|id| !exclude.contains(id))
        .copied()
        .collect()
}

/// Starts batches of contacts in IVR flows
pub struct FlowStartWorker {
    db: Arc<dyn Database>,
    caller: Arc<dyn CallStarter>,
    config: Arc<CourierConfig>,
    metrics: Arc<BatchMetrics>,
}

impl FlowStartWorker {
    pub fn new(db: Arc<dyn Database>, caller: Arc<dyn CallStarter>, config: Arc<CourierConfig>) -> Self {
        Self {
            db,
            caller,
            config,
            metrics: Arc::new(BatchMetrics::new()),
        }
    }

    /// Share a metrics instance with other workers
    pub fn with_metrics(mut self, metrics: Arc<BatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<BatchMetrics> {
        &self.metrics
    }

    /// Decode the batch carried by a queued task
    pub fn decode_task(task: &Task) -> Result<FlowStartBatch> {
        if task.task_type != START_IVR_FLOW_BATCH {
            return Err(CourierError::UnknownTaskType {
                task_type: task.task_type.clone(),
            });
        }
        serde_json::from_value(task.payload.clone()).map_err(|source| CourierError::MalformedBatch {
            payload: task.payload.to_string(),
            source,
        })
    }

    /// Decode and process a queued flow start task
    pub async fn handle_task(&self, task: &Task) -> Result<BatchOutcome> {
        let batch = Self::decode_task(task)?;
        self.handle_flow_start_batch(&batch).await
    }

    /// Process one batch under the configured batch timeout
    pub async fn handle_flow_start_batch(&self, batch: &FlowStartBatch) -> Result<BatchOutcome> {
        let timeout = self.config.batch_timeout;
        let result = match tokio::time::timeout(timeout, self.process_batch(batch)).await {
            Ok(result) => result,
            Err(_) => Err(CourierError::Timeout {
                operation: format!("flow start batch for flow: {}", batch.flow_id()),
                timeout,
            }),
        };

        match &result {
            Ok(outcome) => {
                self.metrics.record_batch_completed();
                tracing::info!(
                    flow_id = %batch.flow_id(),
                    start_id = ?batch.start_id(),
                    candidates = outcome.candidates,
                    excluded = outcome.excluded,
                    dispatched = outcome.dispatched.len(),
                    failed = outcome.failed.len(),
                    "flow start batch complete"
                );
            }
            Err(e) => {
                self.metrics
                    .record_batch_failed(matches!(e, CourierError::Timeout { .. }));
                tracing::error!(
                    error = %e,
                    flow_id = %batch.flow_id(),
                    start_id = ?batch.start_id(),
                    "flow start batch failed"
                );
            }
        }

        result
    }

    async fn process_batch(&self, batch: &FlowStartBatch) -> Result<BatchOutcome> {
        let exclude = compute_exclusions(self.db.as_ref(), batch).await?;
        let contact_ids = filter_contacts(batch.contact_ids(), &exclude);

        let mut outcome = BatchOutcome {
            candidates: batch.contact_ids().len(),
            excluded: batch.contact_ids().len() - contact_ids.len(),
            ..Default::default()
        };
        self.metrics
            .record_exclusions(outcome.candidates, outcome.excluded);

        let org = self
            .db
            .get_org_assets(batch.org_id())
            .await
            .with_context(|| format!("error loading org assets for org: {}", batch.org_id()))?;

        let contacts = self
            .db
            .load_contacts(&org, &contact_ids)
            .await
            .map_err(|e| match e {
                e @ CourierError::ContactNotFound { .. } => e,
                e => CourierError::storage("error loading contacts", e),
            })?;

        // request a call start for each contact, a failure only skips that contact
        let concurrency = self.config.dispatch_concurrency.max(1);
        let mut requests = stream::iter(contacts)
            .map(|contact| {
                let org = org.clone();
                async move {
                    let started = Instant::now();
                    let result = self
                        .caller
                        .request_call_start(&org, batch, &contact)
                        .await;
                    (contact, result, started.elapsed())
                }
            })
            .buffered(concurrency);

        while let Some((contact, result, elapsed)) = requests.next().await {
            outcome.dispatched.push(contact.id);
            match result {
                Ok(session) => {
                    self.metrics.record_call_requested();
                    tracing::debug!(
                        elapsed = ?elapsed,
                        contact_id = %contact.id,
                        status = %session.status,
                        start_id = ?batch.start_id(),
                        external_id = ?session.external_id,
                        "requested call for contact"
                    );
                }
                Err(e) if !e.is_recoverable_call_failure() => {
                    return Err(e);
                }
                Err(e) => {
                    self.metrics.record_call_failed();
                    outcome.failed.push(contact.id);
                    tracing::error!(
                        error = %e,
                        contact_id = %contact.id,
                        flow_id = %batch.flow_id(),
                        "error starting ivr flow for contact"
                    );
                }
            }
        }

        // if this is the last batch, mark our start as complete
        if batch.is_last() {
            match batch.start_id() {
                Some(start_id) => {
                    self.db
                        .mark_start_complete(start_id)
                        .await
                        .with_context(|| format!("error trying to set batch as complete: {}", start_id))?;
                    outcome.marked_complete = true;
                }
                None => {
                    tracing::warn!(flow_id = %batch.flow_id(), "last batch has no start to mark complete");
                }
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl TaskHandler for FlowStartWorker {
    fn task_type(&self) -> &'static str {
        START_IVR_FLOW_BATCH
    }

    async fn handle(&self, task: &Task) -> Result<()> {
        self.handle_task(task).await.map(|_| ())
    }
}
