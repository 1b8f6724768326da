//! Core types for event handling and pre-commit hooks

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{ContactId, ContactUrnsChanged, LabelRef, MsgLabelAdd, Urn};

/// Semantic events produced by the flow engine for a scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The contact's URNs were replaced with `urns`
    ContactUrnsChanged { urns: Vec<Urn> },
    /// Labels were added to the input that triggered the session
    InputLabelsAdded {
        #[serde(default)]
        input_uuid: Option<Uuid>,
        labels: Vec<LabelRef>,
    },
    ContactNameChanged { name: String },
    RunResultChanged {
        name: String,
        value: String,
        #[serde(default)]
        category: Option<String>,
    },
}

impl Event {
    /// The tag used to look up this event's handler
    pub fn event_type(&self) -> EventType {
        match self {
            Event::ContactUrnsChanged { .. } => EventType::ContactUrnsChanged,
            Event::InputLabelsAdded { .. } => EventType::InputLabelsAdded,
            Event::ContactNameChanged { .. } => EventType::ContactNameChanged,
            Event::RunResultChanged { .. } => EventType::RunResultChanged,
        }
    }
}

/// Event type tags, one per [`Event`] variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ContactUrnsChanged,
    InputLabelsAdded,
    ContactNameChanged,
    RunResultChanged,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ContactUrnsChanged => "contact_urns_changed",
            EventType::InputLabelsAdded => "input_labels_added",
            EventType::ContactNameChanged => "contact_name_changed",
            EventType::RunResultChanged => "run_result_changed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a pre-commit hook.
///
/// Contributions from every scene in a pass are grouped by this id, so each
/// hook runs once per transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookId {
    CommitUrnChanges,
    CommitAddedLabels,
    ContactModified,
}

impl HookId {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookId::CommitUrnChanges => "commit_urn_changes",
            HookId::CommitAddedLabels => "commit_added_labels",
            HookId::ContactModified => "contact_modified",
        }
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change record queued on a scene for a pre-commit hook
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreCommitChange {
    ContactUrns(ContactUrnsChanged),
    LabelAdd(MsgLabelAdd),
    ContactModified(ContactId),
}

impl PreCommitChange {
    pub fn kind(&self) -> &'static str {
        match self {
            PreCommitChange::ContactUrns(_) => "contact_urns",
            PreCommitChange::LabelAdd(_) => "label_add",
            PreCommitChange::ContactModified(_) => "contact_modified",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_decodes_from_engine_json() {
        let event: Event = serde_json::from_value(json!({
            "type": "contact_urns_changed",
            "urns": ["tel:+12065551212", "twitter:bob"]
        }))
        .unwrap();

        assert_eq!(event.event_type(), EventType::ContactUrnsChanged);
        assert_eq!(
            event,
            Event::ContactUrnsChanged {
                urns: vec![Urn::from("tel:+12065551212"), Urn::from("twitter:bob")]
            }
        );
    }

    #[test]
    fn test_tags_match_serde_names() {
        let event = Event::ContactNameChanged {
            name: "Bob".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.event_type().as_str());
    }
}
