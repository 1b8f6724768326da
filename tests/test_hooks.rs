//! Test suite for the scene commit pipeline
//!
//! Runs whole passes (dispatch, hook application, commit) against the
//! in-memory store and checks what ends up persisted.

use courier::hooks::{
    commit_scenes, DispatchPolicy, Event, EventHookRegistry, HookContext, HookId, SceneArena,
};
use courier::models::{
    Contact, ContactId, Database, Label, LabelId, LabelRef, MsgId, OrgAssets, OrgId, SceneId,
    Session, SessionId, Urn,
};
use courier::storage::MemoryStore;
use courier::CourierError;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

struct Setup {
    store: MemoryStore,
    registry: EventHookRegistry,
    ctx: HookContext,
    spam: LabelRef,
    urgent: LabelRef,
}

async fn setup() -> Setup {
    let spam = Label {
        id: LabelId(1),
        uuid: Uuid::new_v4(),
        name: "Spam".to_string(),
    };
    let urgent = Label {
        id: LabelId(2),
        uuid: Uuid::new_v4(),
        name: "Urgent".to_string(),
    };
    let spam_ref = LabelRef::new(spam.uuid, &spam.name);
    let urgent_ref = LabelRef::new(urgent.uuid, &urgent.name);

    let store = MemoryStore::new();
    store.add_org(OrgAssets::new(OrgId(1), vec![spam, urgent]));
    for id in [10, 11, 12] {
        store.add_contact(Contact::new(ContactId(id)).with_urns(vec![Urn::from("tel:+1000")]));
    }

    let ctx = HookContext::new(store.get_org_assets(OrgId(1)).await.unwrap());
    Setup {
        store,
        registry: EventHookRegistry::with_defaults(),
        ctx,
        spam: spam_ref,
        urgent: urgent_ref,
    }
}

fn in_session(msg_id: i64) -> Option<Session> {
    Some(Session::new(SessionId(msg_id * 10)).with_incoming_msg(MsgId(msg_id)))
}

fn urns(values: &[&str]) -> Event {
    Event::ContactUrnsChanged {
        urns: values.iter().map(|u| Urn::from(*u)).collect(),
    }
}

fn labels(labels: Vec<LabelRef>) -> Event {
    Event::InputLabelsAdded {
        input_uuid: None,
        labels,
    }
}

/// Each scene gets exactly one URN write, equal to its last change
#[tokio::test]
async fn test_urn_hook_writes_last_change_per_scene() {
    let s = setup().await;
    let mut scenes = SceneArena::new();
    let bob = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), None);
    let ann = scenes.add(OrgId(1), ContactId(11), Uuid::new_v4(), None);

    let events = vec![
        (bob, urns(&["tel:+1"])),
        (ann, urns(&["twitter:ann"])),
        (bob, urns(&["tel:+1", "tel:+2"])),
        (bob, urns(&["tel:+3"])),
    ];

    let report = commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, events, DispatchPolicy::Strict)
        .await
        .unwrap();

    assert_eq!(report.events_handled, 4);
    assert_eq!(s.store.urn_update_calls(), 1);
    assert_eq!(s.store.contact_urns(ContactId(10)), Some(vec![Urn::from("tel:+3")]));
    assert_eq!(s.store.contact_urns(ContactId(11)), Some(vec![Urn::from("twitter:ann")]));
    assert_eq!(s.store.contact_urns(ContactId(12)), Some(vec![Urn::from("tel:+1000")]));

    // contact modified is deduplicated across all URN events
    assert_eq!(s.store.modified_update_calls(), 1);
    assert_eq!(s.store.commits(), 1);
}

/// Duplicate (label, message) pairs never produce duplicate inserts
#[tokio::test]
async fn test_label_hook_deduplicates_across_scenes() {
    let s = setup().await;
    let mut scenes = SceneArena::new();
    // two scenes sharing an incoming message, e.g. a replayed session
    let a = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), in_session(100));
    let b = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), in_session(100));
    let c = scenes.add(OrgId(1), ContactId(11), Uuid::new_v4(), in_session(200));

    let events = vec![
        (a, labels(vec![s.spam.clone(), s.spam.clone()])),
        (b, labels(vec![s.spam.clone(), s.urgent.clone()])),
        (c, labels(vec![s.spam.clone()])),
    ];

    let report = commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, events, DispatchPolicy::Strict)
        .await
        .unwrap();

    assert_eq!(report.hooks_applied, vec![HookId::CommitAddedLabels]);
    assert_eq!(s.store.label_insert_calls(), 1);
    assert_eq!(
        s.store.msg_labels(),
        vec![
            (MsgId(100), LabelId(1)),
            (MsgId(100), LabelId(2)),
            (MsgId(200), LabelId(1)),
        ]
    );
}

/// Applying the same label contributions twice leaves the label set unchanged
#[tokio::test]
async fn test_label_pass_is_idempotent() {
    let s = setup().await;

    for _ in 0..2 {
        let mut scenes = SceneArena::new();
        let a = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), in_session(100));
        let events = vec![(a, labels(vec![s.spam.clone(), s.urgent.clone()]))];
        commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, events, DispatchPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(s.store.msg_labels().len(), 2);
    }

    assert_eq!(s.store.commits(), 2);
}

/// A labels event outside a session fails before anything is queued or written
#[tokio::test]
async fn test_labels_outside_session_rejected() {
    let s = setup().await;
    let mut scenes = SceneArena::new();
    let a = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), None);

    let err = commit_scenes(
        &s.store,
        &s.registry,
        &s.ctx,
        &mut scenes,
        vec![(a, labels(vec![s.spam.clone()]))],
        DispatchPolicy::Strict,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CourierError::NotInSession { scene } if scene == a));
    assert!(scenes.get(a).unwrap().pre_commits().is_empty());
    assert_eq!(s.store.label_insert_calls(), 0);
    assert_eq!(s.store.commits(), 0);
}

/// A rejected event aborts the whole pass, including valid events before it
#[tokio::test]
async fn test_rejected_event_aborts_pass() {
    let s = setup().await;
    let mut scenes = SceneArena::new();
    let bob = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), None);
    let ann = scenes.add(OrgId(1), ContactId(11), Uuid::new_v4(), Some(Session::new(SessionId(5))));

    let events = vec![
        (bob, urns(&["tel:+9"])),
        (ann, labels(vec![s.urgent.clone()])),
    ];
    let err = commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, events, DispatchPolicy::Strict)
        .await
        .unwrap_err();

    assert!(matches!(err, CourierError::NoIncomingMessage { .. }));
    assert_eq!(s.store.contact_urns(ContactId(10)), Some(vec![Urn::from("tel:+1000")]));
    assert_eq!(s.store.urn_update_calls(), 0);
    assert!(scenes.iter().all(|scene| scene.pre_commits().is_empty()));

    // a later pass on the same scenes must not pick up the rejected changes
    let report = commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, Vec::<(SceneId, Event)>::new(), DispatchPolicy::Strict)
        .await
        .unwrap();
    assert!(report.hooks_applied.is_empty());
    assert_eq!(s.store.urn_update_calls(), 0);
    assert_eq!(s.store.contact_urns(ContactId(10)), Some(vec![Urn::from("tel:+1000")]));
}

/// A failing hook rolls back every other hook of the transaction
#[tokio::test]
async fn test_hook_failure_rolls_back_transaction() {
    let s = setup().await;
    s.store.fail_writes(true);

    let mut scenes = SceneArena::new();
    let bob = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), in_session(100));
    let events = vec![
        (bob, labels(vec![s.spam.clone()])),
        (bob, urns(&["tel:+9"])),
    ];

    let err = commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, events, DispatchPolicy::Strict)
        .await
        .unwrap_err();

    assert!(matches!(err, CourierError::Storage { .. }));
    assert_eq!(s.store.rollbacks(), 1);
    assert_eq!(s.store.commits(), 0);
    assert!(s.store.msg_labels().is_empty());
    assert_eq!(s.store.contact_urns(ContactId(10)), Some(vec![Urn::from("tel:+1000")]));
}

/// Every hook with contributions runs exactly once per pass
#[tokio::test]
async fn test_each_hook_applied_once() {
    let s = setup().await;
    let mut scenes = SceneArena::new();
    let ids: Vec<SceneId> = (0..3)
        .map(|i| scenes.add(OrgId(1), ContactId(10 + i), Uuid::new_v4(), in_session(100 + i)))
        .collect();

    let mut events = Vec::new();
    for id in &ids {
        events.push((*id, urns(&["tel:+5"])));
        events.push((*id, labels(vec![s.spam.clone()])));
    }

    let report = commit_scenes(&s.store, &s.registry, &s.ctx, &mut scenes, events, DispatchPolicy::Strict)
        .await
        .unwrap();

    assert_eq!(
        report.hooks_applied,
        vec![HookId::CommitUrnChanges, HookId::CommitAddedLabels, HookId::ContactModified]
    );
    assert_eq!(s.store.urn_update_calls(), 1);
    assert_eq!(s.store.label_insert_calls(), 1);
    assert_eq!(s.store.modified_update_calls(), 1);
    assert_eq!(s.store.msg_labels().len(), 3);
}

/// Unknown event types are fatal by default and skippable on request
#[tokio::test]
async fn test_unknown_event_policy() {
    let s = setup().await;
    let name_changed = Event::ContactNameChanged {
        name: "Robert".to_string(),
    };

    let mut scenes = SceneArena::new();
    let bob = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), None);
    let err = commit_scenes(
        &s.store,
        &s.registry,
        &s.ctx,
        &mut scenes,
        vec![(bob, name_changed.clone())],
        DispatchPolicy::Strict,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CourierError::UnknownEventType { .. }));

    let mut scenes = SceneArena::new();
    let bob = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), None);
    let report = commit_scenes(
        &s.store,
        &s.registry,
        &s.ctx,
        &mut scenes,
        vec![(bob, name_changed), (bob, urns(&["tel:+7"]))],
        DispatchPolicy::SkipUnknown,
    )
    .await
    .unwrap();

    assert_eq!(report.events_skipped, 1);
    assert_eq!(report.events_handled, 1);
    assert_eq!(s.store.contact_urns(ContactId(10)), Some(vec![Urn::from("tel:+7")]));
}

/// A custom registry without hooks refuses to commit queued changes
#[tokio::test]
async fn test_missing_hook_registration() {
    let s = setup().await;
    let registry = EventHookRegistry::new();
    registry.register(
        courier::hooks::EventType::ContactUrnsChanged,
        Arc::new(courier::hooks::ContactUrnsChangedHandler),
    );

    let mut scenes = SceneArena::new();
    let bob = scenes.add(OrgId(1), ContactId(10), Uuid::new_v4(), None);
    let err = commit_scenes(&s.store, &registry, &s.ctx, &mut scenes, vec![(bob, urns(&["tel:+7"]))], DispatchPolicy::Strict)
        .await
        .unwrap_err();

    assert!(matches!(err, CourierError::HookNotRegistered { .. }));
    assert_eq!(s.store.rollbacks(), 1);
}
