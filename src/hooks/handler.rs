//! Event handler and pre-commit hook traits
//!
//! Handlers validate events and queue change records on their scene; they
//! never write to storage. Hooks turn the queued records of a whole pass
//! into a single write against the pass's transaction.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::errors::Result;
use crate::models::{OrgAssets, Transaction};

use super::scene::{Scene, SceneChanges};
use super::types::{Event, HookId};

/// Context shared by all handlers and hooks of one processing pass
#[derive(Clone, Debug)]
pub struct HookContext {
    /// Read-only asset snapshot of the org being processed
    pub org: Arc<OrgAssets>,
}

impl HookContext {
    pub fn new(org: Arc<OrgAssets>) -> Self {
        Self { org }
    }
}

/// Handles one event type for a scene
pub trait EventHandler: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Validate `event` and queue any resulting changes on `scene`
    fn handle(&self, ctx: &HookContext, scene: &mut Scene, event: &Event) -> Result<()>;
}

/// Applies every change queued for it during a pass, once per transaction
#[async_trait]
pub trait PreCommitHook: Send + Sync {
    fn id(&self) -> HookId;

    /// Persist `changes` through `tx`. An error aborts the whole transaction.
    async fn apply(
        &self,
        tx: &mut dyn Transaction,
        ctx: &HookContext,
        changes: &SceneChanges,
    ) -> Result<()>;
}
