//! In-memory implementation of the persistence traits
//!
//! Writes made through a [`MemoryTransaction`] are buffered and only applied
//! to the shared state when the transaction commits. Dropping or rolling
//! back a transaction discards them.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::errors::{CourierError, Result};
use crate::models::{
    Contact, ContactId, ContactUrnsChanged, Database, FlowId, LabelId, MsgId, MsgLabelAdd,
    OrgAssets, OrgId, StartId, Transaction, Urn,
};

#[derive(Default)]
struct State {
    contacts: HashMap<ContactId, Contact>,
    msg_labels: BTreeSet<(MsgId, LabelId)>,
    flow_participants: HashMap<FlowId, HashSet<ContactId>>,
    active_runs: HashSet<ContactId>,
    completed_starts: Vec<StartId>,
}

#[derive(Default)]
struct Counters {
    urn_updates: AtomicUsize,
    label_inserts: AtomicUsize,
    modified_updates: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

struct Inner {
    state: Mutex<State>,
    orgs: DashMap<OrgId, Arc<OrgAssets>>,
    counters: Counters,
    fail_writes: AtomicBool,
    fail_queries: AtomicBool,
    failing_ops: DashSet<&'static str>,
}

/// Shared in-memory database
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                orgs: DashMap::new(),
                counters: Counters::default(),
                fail_writes: AtomicBool::new(false),
                fail_queries: AtomicBool::new(false),
                failing_ops: DashSet::new(),
            }),
        }
    }

    // Seeding

    pub fn add_org(&self, assets: OrgAssets) {
        self.inner.orgs.insert(assets.org_id(), Arc::new(assets));
    }

    pub fn add_contact(&self, contact: Contact) {
        self.inner.state.lock().contacts.insert(contact.id, contact);
    }

    /// Record that `contact_id` has had a run in `flow_id`
    pub fn add_flow_run(&self, flow_id: FlowId, contact_id: ContactId, active: bool) {
        let mut state = self.inner.state.lock();
        state
            .flow_participants
            .entry(flow_id)
            .or_default()
            .insert(contact_id);
        if active {
            state.active_runs.insert(contact_id);
        }
    }

    /// Make every transactional write fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every read query fail
    pub fn fail_queries(&self, fail: bool) {
        self.inner.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make one read operation fail, named after its `Database` method
    pub fn fail_operation(&self, operation: &'static str) {
        self.inner.failing_ops.insert(operation);
    }

    // Inspection

    pub fn contact_urns(&self, contact_id: ContactId) -> Option<Vec<Urn>> {
        self.inner
            .state
            .lock()
            .contacts
            .get(&contact_id)
            .map(|c| c.urns.clone())
    }

    pub fn contact(&self, contact_id: ContactId) -> Option<Contact> {
        self.inner.state.lock().contacts.get(&contact_id).cloned()
    }

    /// Committed (message, label) associations, sorted
    pub fn msg_labels(&self) -> Vec<(MsgId, LabelId)> {
        self.inner.state.lock().msg_labels.iter().copied().collect()
    }

    pub fn completed_starts(&self) -> Vec<StartId> {
        self.inner.state.lock().completed_starts.clone()
    }

    pub fn urn_update_calls(&self) -> usize {
        self.inner.counters.urn_updates.load(Ordering::SeqCst)
    }

    pub fn label_insert_calls(&self) -> usize {
        self.inner.counters.label_inserts.load(Ordering::SeqCst)
    }

    pub fn modified_update_calls(&self) -> usize {
        self.inner.counters.modified_updates.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.inner.counters.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.inner.counters.rollbacks.load(Ordering::SeqCst)
    }

    fn check_query(&self, operation: &str) -> Result<()> {
        if self.inner.fail_queries.load(Ordering::SeqCst)
            || self.inner.failing_ops.contains(operation)
        {
            return Err(CourierError::storage(operation, "query failed"));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

enum PendingWrite {
    ContactUrns(Vec<ContactUrnsChanged>),
    MsgLabels(Vec<MsgLabelAdd>),
    ContactsModified(Vec<ContactId>),
}

/// Buffered transaction against a [`MemoryStore`]
pub struct MemoryTransaction {
    inner: Arc<Inner>,
    pending: Vec<PendingWrite>,
}

impl MemoryTransaction {
    fn check_write(&self, operation: &str) -> Result<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CourierError::storage(operation, "write failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn update_contact_urns(
        &mut self,
        _org: &OrgAssets,
        changes: &[ContactUrnsChanged],
    ) -> Result<()> {
        self.inner.counters.urn_updates.fetch_add(1, Ordering::SeqCst);
        self.check_write("update_contact_urns")?;
        self.pending.push(PendingWrite::ContactUrns(changes.to_vec()));
        Ok(())
    }

    async fn add_msg_labels(&mut self, adds: &[MsgLabelAdd]) -> Result<()> {
        self.inner.counters.label_inserts.fetch_add(1, Ordering::SeqCst);
        self.check_write("add_msg_labels")?;
        self.pending.push(PendingWrite::MsgLabels(adds.to_vec()));
        Ok(())
    }

    async fn update_contacts_modified(&mut self, contact_ids: &[ContactId]) -> Result<()> {
        self.inner
            .counters
            .modified_updates
            .fetch_add(1, Ordering::SeqCst);
        self.check_write("update_contacts_modified")?;
        self.pending
            .push(PendingWrite::ContactsModified(contact_ids.to_vec()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction { inner, pending } = *self;
        let now = Utc::now();
        let mut state = inner.state.lock();

        for write in pending {
            match write {
                PendingWrite::ContactUrns(changes) => {
                    for change in changes {
                        let contact = state
                            .contacts
                            .entry(change.contact_id)
                            .or_insert_with(|| Contact::new(change.contact_id));
                        contact.urns = change.urns;
                    }
                }
                PendingWrite::MsgLabels(adds) => {
                    // inserting an existing association is a no-op
                    state
                        .msg_labels
                        .extend(adds.into_iter().map(|a| (a.msg_id, a.label_id)));
                }
                PendingWrite::ContactsModified(ids) => {
                    for id in ids {
                        if let Some(contact) = state.contacts.get_mut(&id) {
                            contact.modified_on = now;
                        }
                    }
                }
            }
        }
        drop(state);

        inner.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            inner: self.inner.clone(),
            pending: Vec::new(),
        }))
    }

    async fn find_flow_started_overlap(
        &self,
        flow_id: FlowId,
        contact_ids: &[ContactId],
    ) -> Result<Vec<ContactId>> {
        self.check_query("find_flow_started_overlap")?;
        let state = self.inner.state.lock();
        let Some(participants) = state.flow_participants.get(&flow_id) else {
            return Ok(Vec::new());
        };
        Ok(contact_ids
            .iter()
            .filter(|id| participants.contains(id))
            .copied()
            .collect())
    }

    async fn find_active_run_overlap(&self, contact_ids: &[ContactId]) -> Result<Vec<ContactId>> {
        self.check_query("find_active_run_overlap")?;
        let state = self.inner.state.lock();
        Ok(contact_ids
            .iter()
            .filter(|id| state.active_runs.contains(id))
            .copied()
            .collect())
    }

    async fn load_contacts(
        &self,
        _org: &OrgAssets,
        contact_ids: &[ContactId],
    ) -> Result<Vec<Contact>> {
        self.check_query("load_contacts")?;
        let state = self.inner.state.lock();
        contact_ids
            .iter()
            .map(|id| {
                state
                    .contacts
                    .get(id)
                    .cloned()
                    .ok_or(CourierError::ContactNotFound { contact_id: *id })
            })
            .collect()
    }

    async fn mark_start_complete(&self, start_id: StartId) -> Result<()> {
        self.check_query("mark_start_complete")?;
        self.inner.state.lock().completed_starts.push(start_id);
        Ok(())
    }

    async fn get_org_assets(&self, org_id: OrgId) -> Result<Arc<OrgAssets>> {
        self.check_query("get_org_assets")?;
        let assets = self
            .inner
            .orgs
            .entry(org_id)
            .or_insert_with(|| Arc::new(OrgAssets::new(org_id, Vec::new())));
        Ok(assets.value().clone())
    }
}
