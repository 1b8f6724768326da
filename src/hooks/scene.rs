//! Scenes and the arena that holds them for one processing pass

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::errors::{CourierError, Result};
use crate::models::{ContactId, OrgId, SceneId, Session, SessionId};

use super::types::{HookId, PreCommitChange};

/// Contributions for one hook, keyed by the scene that produced them
pub type SceneChanges = BTreeMap<SceneId, Vec<PreCommitChange>>;

/// All contributions of a pass, grouped by hook
pub type GroupedChanges = BTreeMap<HookId, SceneChanges>;

/// The unit of work for one contact within a processing pass
#[derive(Debug, Clone)]
pub struct Scene {
    id: SceneId,
    contact_id: ContactId,
    contact_uuid: Uuid,
    org_id: OrgId,
    session: Option<Session>,
    pre_commits: Vec<(HookId, PreCommitChange)>,
}

impl Scene {
    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    pub fn contact_uuid(&self) -> Uuid {
        self.contact_uuid
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.map(|s| s.id)
    }

    /// Queue a change to be applied by `hook` when the pass commits
    pub fn add_pre_commit(&mut self, hook: HookId, change: PreCommitChange) {
        self.pre_commits.push((hook, change));
    }

    /// Changes queued so far, in the order they were added
    pub fn pre_commits(&self) -> &[(HookId, PreCommitChange)] {
        &self.pre_commits
    }

    fn take_pre_commits(&mut self) -> Vec<(HookId, PreCommitChange)> {
        std::mem::take(&mut self.pre_commits)
    }
}

/// Scenes processed together, addressed by [`SceneId`]
#[derive(Debug, Default)]
pub struct SceneArena {
    scenes: Vec<Scene>,
}

impl SceneArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scene for a contact and return its id
    pub fn add(
        &mut self,
        org_id: OrgId,
        contact_id: ContactId,
        contact_uuid: Uuid,
        session: Option<Session>,
    ) -> SceneId {
        let id = SceneId(self.scenes.len() as i64);
        self.scenes.push(Scene {
            id,
            contact_id,
            contact_uuid,
            org_id,
            session,
            pre_commits: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: SceneId) -> Option<&Scene> {
        usize::try_from(id.0).ok().and_then(|i| self.scenes.get(i))
    }

    pub fn get_mut(&mut self, id: SceneId) -> Result<&mut Scene> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.scenes.get_mut(i))
            .ok_or(CourierError::SceneNotFound { scene: id })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Drain every scene's queued changes and group them by hook.
    ///
    /// Within a scene the original order is kept; scenes are ordered by id.
    pub fn drain_pre_commits(&mut self) -> GroupedChanges {
        let mut grouped = GroupedChanges::new();
        for scene in &mut self.scenes {
            let scene_id = scene.id;
            for (hook, change) in scene.take_pre_commits() {
                grouped
                    .entry(hook)
                    .or_default()
                    .entry(scene_id)
                    .or_default()
                    .push(change);
            }
        }
        grouped
    }
}
