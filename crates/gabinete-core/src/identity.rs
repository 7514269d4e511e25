//! Identity provider contract.
//!
//! The provider owns authentication. The access core only consumes its
//! sessions and its change notifications.

use std::sync::Arc;

use crate::error::GabineteResult;
use crate::models::session::{IdentitySession, SessionEvent};

/// Callback invoked by the provider on every session change.
///
/// Listeners run on the provider's notification path and must return
/// without awaiting anything.
pub type SessionListener = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Handle returned by [`IdentityProvider::on_session_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait IdentityProvider: Send + Sync {
    /// The live session, if any.
    fn current_session(
        &self,
    ) -> impl Future<Output = GabineteResult<Option<IdentitySession>>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = GabineteResult<IdentitySession>> + Send;

    fn sign_out(&self) -> impl Future<Output = GabineteResult<()>> + Send;

    fn on_session_change(&self, listener: SessionListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}
