//! Queued task envelope and task-type registry

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::core::errors::{CourierError, Result};
use crate::models::{FlowStartBatch, OrgId};

/// Task type for starting a batch of contacts in an IVR flow
pub const START_IVR_FLOW_BATCH: &str = "start_ivr_flow_batch";

/// A task as carried by the queue transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub task_type: String,
    pub org_id: OrgId,
    #[serde(rename = "task")]
    pub payload: Value,
    pub queued_on: DateTime<Utc>,
}

impl Task {
    pub fn new(task_type: impl Into<String>, org_id: OrgId, payload: Value) -> Self {
        Self {
            task_type: task_type.into(),
            org_id,
            payload,
            queued_on: Utc::now(),
        }
    }

    /// Wrap a flow start batch for the ivr worker
    pub fn flow_start_batch(batch: &FlowStartBatch) -> Result<Self> {
        Ok(Self::new(
            START_IVR_FLOW_BATCH,
            batch.org_id(),
            serde_json::to_value(batch)?,
        ))
    }

    /// Decode a task from its wire form
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode the task to its wire form
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Handles every task of one type
#[async_trait]
pub trait TaskHandler: Send + Sync {
    fn task_type(&self) -> &'static str;

    async fn handle(&self, task: &Task) -> Result<()>;
}

/// Task type to handler table, built at startup
#[derive(Default)]
pub struct TaskRegistry {
    handlers: DashMap<&'static str, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(handler.task_type(), handler);
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(task_type).map(|h| h.value().clone())
    }

    /// Route a task to the handler for its type
    pub async fn dispatch(&self, task: &Task) -> Result<()> {
        let handler = self
            .get(&task.task_type)
            .ok_or_else(|| CourierError::UnknownTaskType {
                task_type: task.task_type.clone(),
            })?;
        handler.handle(task).await
    }
}
