use async_trait::async_trait;

use crate::core::errors::{CourierError, Result, ResultExt};
use crate::models::{ContactUrnsChanged, Transaction};

use super::handler::{EventHandler, HookContext, PreCommitHook};
use super::scene::{Scene, SceneChanges};
use super::types::{Event, HookId, PreCommitChange};

/// Queues the new URN set of a contact whenever its URNs change
pub struct ContactUrnsChangedHandler;

impl EventHandler for ContactUrnsChangedHandler {
    fn name(&self) -> &'static str {
        "contact_urns_changed"
    }

    fn handle(&self, ctx: &HookContext, scene: &mut Scene, event: &Event) -> Result<()> {
        let urns = match event {
            Event::ContactUrnsChanged { urns } => urns,
            other => {
                return Err(CourierError::HookMismatch {
                    hook: self.name(),
                    found: other.event_type().as_str(),
                })
            }
        };

        tracing::debug!(
            contact_uuid = %scene.contact_uuid(),
            session_id = ?scene.session_id(),
            urns = ?urns,
            "contact urns changed"
        );

        let change = ContactUrnsChanged {
            contact_id: scene.contact_id(),
            org_id: ctx.org.org_id(),
            urns: urns.clone(),
        };

        scene.add_pre_commit(HookId::CommitUrnChanges, PreCommitChange::ContactUrns(change));
        scene.add_pre_commit(
            HookId::ContactModified,
            PreCommitChange::ContactModified(scene.contact_id()),
        );

        Ok(())
    }
}

/// Writes the URN changes of a pass in one batch
pub struct CommitUrnChangesHook;

#[async_trait]
impl PreCommitHook for CommitUrnChangesHook {
    fn id(&self) -> HookId {
        HookId::CommitUrnChanges
    }

    async fn apply(
        &self,
        tx: &mut dyn Transaction,
        ctx: &HookContext,
        changes: &SceneChanges,
    ) -> Result<()> {
        // only the last change for each scene matters, earlier ones are intermediate states
        let mut updates = Vec::with_capacity(changes.len());
        for scene_changes in changes.values() {
            match scene_changes.last() {
                Some(PreCommitChange::ContactUrns(change)) => updates.push(change.clone()),
                Some(other) => {
                    return Err(CourierError::HookMismatch {
                        hook: self.id().as_str(),
                        found: other.kind(),
                    })
                }
                None => {}
            }
        }

        if updates.is_empty() {
            return Ok(());
        }

        tx.update_contact_urns(&ctx.org, &updates)
            .await
            .context("error updating contact urns")
    }
}
