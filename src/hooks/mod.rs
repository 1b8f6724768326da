//! Event hook system for scene processing
//!
//! Handlers process flow events and queue change records on scenes, never
//! touching storage directly. At commit time the queued records are grouped
//! by hook and each hook writes its batch once per transaction.

pub mod commit;
pub mod contact_modified;
pub mod contact_urns;
pub mod handler;
pub mod input_labels;
pub mod registry;
pub mod scene;
pub mod types;

pub use commit::{apply_pre_commit_hooks, commit_scenes, process_events, DispatchPolicy, PassReport};
pub use contact_modified::ContactModifiedHook;
pub use contact_urns::{CommitUrnChangesHook, ContactUrnsChangedHandler};
pub use handler::{EventHandler, HookContext, PreCommitHook};
pub use input_labels::{CommitAddedLabelsHook, InputLabelsAddedHandler};
pub use registry::EventHookRegistry;
pub use scene::{GroupedChanges, Scene, SceneArena, SceneChanges};
pub use types::{Event, EventType, HookId, PreCommitChange};
