use async_trait::async_trait;
use std::collections::HashSet;

use crate::core::errors::{CourierError, Result, ResultExt};
use crate::models::{MsgLabelAdd, Transaction};

use super::handler::{EventHandler, HookContext, PreCommitHook};
use super::scene::{Scene, SceneChanges};
use super::types::{Event, HookId, PreCommitChange};

/// Queues a label insertion for the session's incoming message per label added
pub struct InputLabelsAddedHandler;

impl EventHandler for InputLabelsAddedHandler {
    fn name(&self) -> &'static str {
        "input_labels_added"
    }

    fn handle(&self, ctx: &HookContext, scene: &mut Scene, event: &Event) -> Result<()> {
        let labels = match event {
            Event::InputLabelsAdded { labels, .. } => labels,
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
            labels = ?labels.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
            "input labels added"
        );

        // each label is checked in turn, nothing is queued until all of them pass
        let mut adds = Vec::with_capacity(labels.len());
        for label_ref in labels {
            let label = ctx.org.label_by_uuid(&label_ref.uuid).ok_or_else(|| {
                CourierError::UnresolvedReference {
                    kind: "label",
                    reference: label_ref.uuid.to_string(),
                }
            })?;
            let session = scene
                .session()
                .ok_or(CourierError::NotInSession { scene: scene.id() })?;
            let msg_id = session
                .incoming_msg_id
                .ok_or(CourierError::NoIncomingMessage { scene: scene.id() })?;
            adds.push(MsgLabelAdd {
                msg_id,
                label_id: label.id,
            });
        }

        for add in adds {
            scene.add_pre_commit(HookId::CommitAddedLabels, PreCommitChange::LabelAdd(add));
        }

        Ok(())
    }
}

/// Inserts the label additions of a pass in one batch
pub struct CommitAddedLabelsHook;

#[async_trait]
impl PreCommitHook for CommitAddedLabelsHook {
    fn id(&self) -> HookId {
        HookId::CommitAddedLabels
    }

    async fn apply(
        &self,
        tx: &mut dyn Transaction,
        _ctx: &HookContext,
        changes: &SceneChanges,
    ) -> Result<()> {
        // never double add in the same transaction
        let mut seen = HashSet::new();
        let mut adds = Vec::with_capacity(changes.len());

        for scene_changes in changes.values() {
            for change in scene_changes {
                let add = match change {
                    PreCommitChange::LabelAdd(add) => add,
                    other => {
                        return Err(CourierError::HookMismatch {
                            hook: self.id().as_str(),
                            found: other.kind(),
                        })
                    }
                };
                if seen.insert((add.label_id, add.msg_id)) {
                    adds.push(*add);
                }
            }
        }

        if adds.is_empty() {
            return Ok(());
        }

        tx.add_msg_labels(&adds)
            .await
            .context("error adding message labels")
    }
}
