use serde::{Deserialize, Serialize};

use super::ids::{ContactId, FlowId, OrgId, StartId};

/// A batch of contacts to start in a flow.
///
/// Created by the upstream scheduler and consumed exactly once by the ivr
/// worker. Fields are read through accessors so a decoded batch can't be
/// changed while it is being processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStartBatch {
    #[serde(default)]
    start_id: Option<StartId>,
    org_id: OrgId,
    flow_id: FlowId,
    contact_ids: Vec<ContactId>,
    #[serde(default)]
    restart_participants: bool,
    #[serde(default)]
    include_active: bool,
    #[serde(default)]
    is_last: bool,
}

impl FlowStartBatch {
    /// Create a batch with restart and include-active turned off
    pub fn new(org_id: OrgId, flow_id: FlowId, contact_ids: Vec<ContactId>) -> Self {
        Self {
            start_id: None,
            org_id,
            flow_id,
            contact_ids,
            restart_participants: false,
            include_active: false,
            is_last: false,
        }
    }

    pub fn with_start_id(mut self, start_id: StartId) -> Self {
        self.start_id = Some(start_id);
        self
    }

    pub fn with_restart_participants(mut self, restart: bool) -> Self {
        self.restart_participants = restart;
        self
    }

    pub fn with_include_active(mut self, include: bool) -> Self {
        self.include_active = include;
        self
    }

    pub fn with_is_last(mut self, is_last: bool) -> Self {
        self.is_last = is_last;
        self
    }

    pub fn start_id(&self) -> Option<StartId> {
        self.start_id
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    pub fn contact_ids(&self) -> &[ContactId] {
        &self.contact_ids
    }

    pub fn restart_participants(&self) -> bool {
        self.restart_participants
    }

    pub fn include_active(&self) -> bool {
        self.include_active
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }
}
