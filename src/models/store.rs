//! Persistence contracts consumed by the hooks and the ivr worker.
//!
//! SQL execution lives behind these traits; [`crate::storage::MemoryStore`]
//! is the in-process implementation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::errors::Result;

use super::assets::OrgAssets;
use super::changes::{ContactUrnsChanged, MsgLabelAdd};
use super::contact::Contact;
use super::ids::{ContactId, FlowId, OrgId, StartId};

/// Writes performed inside one database transaction.
///
/// A transaction is owned by exactly one commit pass. Nothing written
/// through it is visible until [`Transaction::commit`] succeeds.
#[async_trait]
pub trait Transaction: Send {
    /// Replace the URN sets of the given contacts
    async fn update_contact_urns(
        &mut self,
        org: &OrgAssets,
        changes: &[ContactUrnsChanged],
    ) -> Result<()>;

    /// Insert message label associations
    async fn add_msg_labels(&mut self, adds: &[MsgLabelAdd]) -> Result<()>;

    /// Bump the modified timestamp of the given contacts
    async fn update_contacts_modified(&mut self, contact_ids: &[ContactId]) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Read queries and transaction factory
#[async_trait]
pub trait Database: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Contacts among `contact_ids` that have ever had a run in `flow_id`
    async fn find_flow_started_overlap(
        &self,
        flow_id: FlowId,
        contact_ids: &[ContactId],
    ) -> Result<Vec<ContactId>>;

    /// Contacts among `contact_ids` that currently have an active run in any flow
    async fn find_active_run_overlap(&self, contact_ids: &[ContactId]) -> Result<Vec<ContactId>>;

    /// Load full contact records, in the order of `contact_ids`
    async fn load_contacts(&self, org: &OrgAssets, contact_ids: &[ContactId])
        -> Result<Vec<Contact>>;

    /// Mark a flow start as complete
    async fn mark_start_complete(&self, start_id: StartId) -> Result<()>;

    /// Load the (cached) asset snapshot of an org
    async fn get_org_assets(&self, org_id: OrgId) -> Result<Arc<OrgAssets>>;
}
