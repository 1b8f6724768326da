use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::ids::{LabelId, OrgId};

/// A message label as stored for an org
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub uuid: Uuid,
    pub name: String,
}

/// Reference to a label as carried by flow events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    pub uuid: Uuid,
    pub name: String,
}

impl LabelRef {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

/// Read-only snapshot of the assets of one org.
///
/// Shared behind an `Arc` for the duration of a scene pass or batch.
#[derive(Debug, Clone)]
pub struct OrgAssets {
    org_id: OrgId,
    labels_by_uuid: HashMap<Uuid, Label>,
}

impl OrgAssets {
    pub fn new(org_id: OrgId, labels: impl IntoIterator<Item = Label>) -> Self {
        Self {
            org_id,
            labels_by_uuid: labels.into_iter().map(|l| (l.uuid, l)).collect(),
        }
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn label_by_uuid(&self, uuid: &Uuid) -> Option<&Label> {
        self.labels_by_uuid.get(uuid)
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels_by_uuid.values()
    }
}
