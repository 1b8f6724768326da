use async_trait::async_trait;

use crate::core::errors::Result;
use crate::models::{ChannelSession, Contact, FlowStartBatch, OrgAssets};

/// The external call channel used to place outgoing IVR calls.
///
/// Implementations must give up promptly when their future is dropped; the
/// worker enforces the batch deadline by dropping in-flight requests.
/// Returning [`crate::CourierError::Cancelled`] or
/// [`crate::CourierError::Timeout`] aborts the whole batch, any other error
/// only skips the contact.
#[async_trait]
pub trait CallStarter: Send + Sync {
    async fn request_call_start(
        &self,
        org: &OrgAssets,
        batch: &FlowStartBatch,
        contact: &Contact,
    ) -> Result<ChannelSession>;
}
