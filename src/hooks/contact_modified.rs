use async_trait::async_trait;
use std::collections::HashSet;

use crate::core::errors::{CourierError, Result, ResultExt};
use crate::models::Transaction;

use super::handler::{HookContext, PreCommitHook};
use super::scene::SceneChanges;
use super::types::{HookId, PreCommitChange};

/// Bumps `modified_on` once for every contact touched during a pass
pub struct ContactModifiedHook;

#[async_trait]
impl PreCommitHook for ContactModifiedHook {
    fn id(&self) -> HookId {
        HookId::ContactModified
    }

    async fn apply(
        &self,
        tx: &mut dyn Transaction,
        _ctx: &HookContext,
        changes: &SceneChanges,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        let mut contact_ids = Vec::with_capacity(changes.len());

        for change in changes.values().flatten() {
            match change {
                PreCommitChange::ContactModified(id) => {
                    if seen.insert(*id) {
                        contact_ids.push(*id);
                    }
                }
                other => {
                    return Err(CourierError::HookMismatch {
                        hook: self.id().as_str(),
                        found: other.kind(),
                    })
                }
            }
        }

        if contact_ids.is_empty() {
            return Ok(());
        }

        tx.update_contacts_modified(&contact_ids)
            .await
            .context("error updating contact modified_on")
    }
}
