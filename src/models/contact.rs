use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::ContactId;
use super::Urn;

/// Lifecycle status of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Active,
    Blocked,
    Stopped,
    Archived,
}

/// A contact as loaded for call dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub uuid: Uuid,
    pub name: Option<String>,
    pub status: ContactStatus,
    pub urns: Vec<Urn>,
    pub modified_on: DateTime<Utc>,
}

impl Contact {
    /// Create an active contact with no URNs
    pub fn new(id: ContactId) -> Self {
        Self {
            id,
            uuid: Uuid::new_v4(),
            name: None,
            status: ContactStatus::Active,
            urns: Vec::new(),
            modified_on: Utc::now(),
        }
    }

    pub fn with_urns(mut self, urns: Vec<Urn>) -> Self {
        self.urns = urns;
        self
    }
}

/// Status of an outgoing call session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Pending,
    Queued,
    Wired,
    InProgress,
    Completed,
    Errored,
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::Queued => "queued",
            CallStatus::Wired => "wired",
            CallStatus::InProgress => "in_progress",
            CallStatus::Completed => "completed",
            CallStatus::Errored => "errored",
            CallStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor returned by the call channel for a requested call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSession {
    pub contact_id: ContactId,
    pub status: CallStatus,
    pub external_id: Option<String>,
}
