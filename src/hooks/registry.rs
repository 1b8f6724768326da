//! Registry mapping event types to handlers and hook ids to hooks
//!
//! Built once at startup and shared by reference with whatever drives the
//! scene passes.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::errors::{CourierError, Result};

use super::contact_modified::ContactModifiedHook;
use super::contact_urns::{CommitUrnChangesHook, ContactUrnsChangedHandler};
use super::handler::{EventHandler, HookContext, PreCommitHook};
use super::input_labels::{CommitAddedLabelsHook, InputLabelsAddedHandler};
use super::scene::Scene;
use super::types::{Event, EventType, HookId};

/// Registry for event handlers and pre-commit hooks
#[derive(Clone)]
pub struct EventHookRegistry {
    handlers: Arc<RwLock<HashMap<EventType, Arc<dyn EventHandler>>>>,
    hooks: Arc<RwLock<HashMap<HookId, Arc<dyn PreCommitHook>>>>,
}

impl EventHookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            hooks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry with the built-in handlers and hooks
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(EventType::ContactUrnsChanged, Arc::new(ContactUrnsChangedHandler));
        registry.register(EventType::InputLabelsAdded, Arc::new(InputLabelsAddedHandler));
        registry.register_hook(Arc::new(CommitUrnChangesHook));
        registry.register_hook(Arc::new(CommitAddedLabelsHook));
        registry.register_hook(Arc::new(ContactModifiedHook));
        registry
    }

    /// Register the handler for an event type, replacing any previous one
    pub fn register(&self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write();
        if handlers.insert(event_type, handler).is_some() {
            tracing::warn!(event_type = %event_type, "replaced existing event handler");
        }
    }

    /// Register a pre-commit hook under its own id
    pub fn register_hook(&self, hook: Arc<dyn PreCommitHook>) {
        let mut hooks = self.hooks.write();
        hooks.insert(hook.id(), hook);
    }

    pub fn handler(&self, event_type: EventType) -> Option<Arc<dyn EventHandler>> {
        self.handlers.read().get(&event_type).cloned()
    }

    pub fn hook(&self, id: HookId) -> Option<Arc<dyn PreCommitHook>> {
        self.hooks.read().get(&id).cloned()
    }

    pub fn contains(&self, event_type: EventType) -> bool {
        self.handlers.read().contains_key(&event_type)
    }

    /// Event types that have a handler
    pub fn event_types(&self) -> Vec<EventType> {
        let mut types: Vec<_> = self.handlers.read().keys().copied().collect();
        types.sort();
        types
    }

    /// Route `event` to its handler for `scene`
    pub fn dispatch(&self, ctx: &HookContext, scene: &mut Scene, event: &Event) -> Result<()> {
        let event_type = event.event_type();
        let handler = self
            .handler(event_type)
            .ok_or_else(|| CourierError::UnknownEventType {
                event_type: event_type.to_string(),
            })?;
        handler.handle(ctx, scene, event)
    }
}

impl Default for EventHookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactId, OrgAssets, OrgId};
    use crate::hooks::scene::SceneArena;
    use uuid::Uuid;

    #[test]
    fn test_defaults() {
        let registry = EventHookRegistry::with_defaults();
        assert_eq!(
            registry.event_types(),
            vec![EventType::ContactUrnsChanged, EventType::InputLabelsAdded]
        );
        assert!(registry.hook(HookId::CommitUrnChanges).is_some());
        assert!(registry.hook(HookId::CommitAddedLabels).is_some());
        assert!(registry.hook(HookId::ContactModified).is_some());
    }

    #[test]
    fn test_dispatch_unknown_event_type() {
        let registry = EventHookRegistry::with_defaults();
        let ctx = HookContext::new(Arc::new(OrgAssets::new(OrgId(1), vec![])));
        let mut arena = SceneArena::new();
        let id = arena.add(OrgId(1), ContactId(1), Uuid::new_v4(), None);

        let event = Event::ContactNameChanged {
            name: "Bob".to_string(),
        };
        let err = registry
            .dispatch(&ctx, arena.get_mut(id).unwrap(), &event)
            .unwrap_err();

        match err {
            CourierError::UnknownEventType { event_type } => {
                assert_eq!(event_type, "contact_name_changed")
            }
            other => panic!("Expected UnknownEventType, got {:?}", other),
        }
        assert!(arena.get(id).unwrap().pre_commits().is_empty());
    }
}
