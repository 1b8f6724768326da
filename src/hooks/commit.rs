//! Scene pass driver: event dispatch followed by pre-commit hook application

use crate::core::errors::{CourierError, Result};
use crate::models::{Database, SceneId, Transaction};

use super::handler::HookContext;
use super::registry::EventHookRegistry;
use super::scene::SceneArena;
use super::types::{Event, HookId};

/// What to do with events that have no registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Fail the pass with `UnknownEventType`
    #[default]
    Strict,
    /// Log and skip the event
    SkipUnknown,
}

/// Summary of one scene pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub events_handled: usize,
    pub events_skipped: usize,
    pub hooks_applied: Vec<HookId>,
}

/// Dispatch each `(scene, event)` pair to its handler, in order.
///
/// The first error stops processing; changes queued by earlier events stay
/// on their scenes until the caller drains or commits them.
pub fn process_events<I>(
    registry: &EventHookRegistry,
    ctx: &HookContext,
    scenes: &mut SceneArena,
    events: I,
    policy: DispatchPolicy,
    report: &mut PassReport,
) -> Result<()>
where
    I: IntoIterator<Item = (SceneId, Event)>,
{
    for (scene_id, event) in events {
        let scene = scenes.get_mut(scene_id)?;
        match registry.dispatch(ctx, scene, &event) {
            Ok(()) => report.events_handled += 1,
            Err(CourierError::UnknownEventType { event_type })
                if policy == DispatchPolicy::SkipUnknown =>
            {
                tracing::debug!(scene = %scene_id, event_type = %event_type, "skipping event with no handler");
                report.events_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Drain every scene's queued changes and apply each hook once against `tx`.
///
/// Returns the hooks applied, in application order. Any hook error is
/// returned immediately; the caller must then roll back `tx`.
pub async fn apply_pre_commit_hooks(
    registry: &EventHookRegistry,
    tx: &mut dyn Transaction,
    ctx: &HookContext,
    scenes: &mut SceneArena,
) -> Result<Vec<HookId>> {
    let grouped = scenes.drain_pre_commits();
    let mut applied = Vec::with_capacity(grouped.len());

    for (hook_id, changes) in &grouped {
        let hook = registry
            .hook(*hook_id)
            .ok_or(CourierError::HookNotRegistered {
                hook: hook_id.as_str(),
            })?;

        tracing::debug!(hook = %hook_id, scenes = changes.len(), "applying pre commit hook");
        hook.apply(&mut *tx, ctx, changes).await?;
        applied.push(*hook_id);
    }

    Ok(applied)
}

/// Run a complete pass in its own transaction.
///
/// Events are dispatched, hooks applied and the transaction committed. Any
/// failure discards the pass's queued changes and rolls the transaction
/// back so nothing from the pass persists.
pub async fn commit_scenes<I>(
    db: &dyn Database,
    registry: &EventHookRegistry,
    ctx: &HookContext,
    scenes: &mut SceneArena,
    events: I,
    policy: DispatchPolicy,
) -> Result<PassReport>
where
    I: IntoIterator<Item = (SceneId, Event)>,
{
    let mut report = PassReport::default();
    if let Err(e) = process_events(registry, ctx, scenes, events, policy, &mut report) {
        // changes queued by earlier events of this pass must never reach a later commit
        scenes.drain_pre_commits();
        return Err(e);
    }

    let mut tx = db.begin().await?;
    match apply_pre_commit_hooks(registry, tx.as_mut(), ctx, scenes).await {
        Ok(applied) => {
            tx.commit().await?;
            report.hooks_applied = applied;
            Ok(report)
        }
        Err(e) => {
            tracing::error!(error = %e, org_id = %ctx.org.org_id(), "pre commit hooks failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "error rolling back transaction");
            }
            Err(e)
        }
    }
}
