//! Change records emitted by event handlers and consumed by pre-commit hooks

use serde::{Deserialize, Serialize};

use super::ids::{ContactId, LabelId, MsgId, OrgId};
use super::Urn;

/// The final URN set for a contact, not a delta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUrnsChanged {
    pub contact_id: ContactId,
    pub org_id: OrgId,
    pub urns: Vec<Urn>,
}

/// One (message, label) association to insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsgLabelAdd {
    pub msg_id: MsgId,
    pub label_id: LabelId,
}
