//! Data model shared by the commit pipeline and the ivr worker

pub mod assets;
pub mod batch;
pub mod changes;
pub mod contact;
pub mod ids;
pub mod store;

pub use assets::{Label, LabelRef, OrgAssets};
pub use batch::FlowStartBatch;
pub use changes::{ContactUrnsChanged, MsgLabelAdd};
pub use contact::{CallStatus, ChannelSession, Contact, ContactStatus};
pub use ids::*;
pub use store::{Database, Transaction};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A contact URN such as `tel:+250788123123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    pub fn new(urn: impl Into<String>) -> Self {
        Self(urn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme part, e.g. `tel`
    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(s, _)| s).unwrap_or("")
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Urn {
    fn from(urn: &str) -> Self {
        Self::new(urn)
    }
}

/// An active flow session and the message that triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub incoming_msg_id: Option<MsgId>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            incoming_msg_id: None,
        }
    }

    pub fn with_incoming_msg(mut self, msg_id: MsgId) -> Self {
        self.incoming_msg_id = Some(msg_id);
        self
    }
}
