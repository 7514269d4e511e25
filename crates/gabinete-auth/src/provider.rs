//! Password identity provider.
//!
//! Holds at most one live session (the identity of this process) and
//! broadcasts every change of it to registered listeners.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{Duration, Utc};
use gabinete_core::error::GabineteResult;
use gabinete_core::identity::{IdentityProvider, SessionListener, SubscriptionId};
use gabinete_core::models::credential::CreateCredential;
use gabinete_core::models::session::{IdentitySession, SessionEvent};
use gabinete_core::repository::CredentialRepository;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Identity provider backed by a [`CredentialRepository`].
///
/// Generic over the repository so that the auth layer has no
/// dependency on the database crate.
pub struct PasswordIdentityProvider<C: CredentialRepository> {
    credentials: C,
    config: AuthConfig,
    current: RwLock<Option<IdentitySession>>,
    listeners: Mutex<Vec<(SubscriptionId, SessionListener)>>,
    next_subscription: AtomicU64,
}

impl<C: CredentialRepository> PasswordIdentityProvider<C> {
    pub fn new(credentials: C, config: AuthConfig) -> Self {
        Self {
            credentials,
            config,
            current: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Store a password credential for an identity.
    pub async fn register(&self, user_id: Uuid, email: &str, password: &str) -> GabineteResult<()> {
        password::check_policy(password, self.config.min_password_length)?;
        let password_hash = password::hash_password(password, self.config.pepper.as_deref())?;

        self.credentials
            .create(CreateCredential {
                user_id,
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!(%user_id, "Credential registered");
        Ok(())
    }

    /// Rotate the token of the live session and extend its expiry.
    pub async fn refresh_session(&self) -> GabineteResult<IdentitySession> {
        let refreshed = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let session = current.as_ref().ok_or(AuthError::NoSession)?;
            if session.is_expired() {
                *current = None;
                None
            } else {
                let next = self.issue(session.user_id, &session.email)?;
                *current = Some(next.clone());
                Some(next)
            }
        };

        match refreshed {
            Some(session) => {
                debug!(
                    user_id = %session.user_id,
                    token = %token::fingerprint(&session.access_token),
                    "Session refreshed"
                );
                self.notify(SessionEvent::TokenRefreshed(session.clone()));
                Ok(session)
            }
            None => {
                self.notify(SessionEvent::SignedOut);
                Err(AuthError::SessionExpired.into())
            }
        }
    }

    fn issue(&self, user_id: Uuid, email: &str) -> Result<IdentitySession, AuthError> {
        let secs = self.config.session_lifetime_secs;
        let expires_at = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or(AuthError::InvalidLifetime { secs })?;

        Ok(IdentitySession {
            user_id,
            email: email.to_string(),
            access_token: token::generate_session_token(),
            expires_at,
        })
    }

    /// Deliver `event` to every listener. The listener list is copied
    /// first so no lock is held while callbacks run.
    fn notify(&self, event: SessionEvent) {
        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(event.clone());
        }
    }
}

impl<C: CredentialRepository> IdentityProvider for PasswordIdentityProvider<C> {
    async fn current_session(&self) -> GabineteResult<Option<IdentitySession>> {
        let expired = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            match current.as_ref() {
                Some(session) if session.is_expired() => {
                    *current = None;
                    true
                }
                Some(session) => return Ok(Some(session.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            debug!("Dropping expired session");
            self.notify(SessionEvent::SignedOut);
        }
        Ok(None)
    }

    async fn sign_in(&self, email: &str, password: &str) -> GabineteResult<IdentitySession> {
        // Unknown email and wrong password are indistinguishable to the
        // caller.
        let credential = self
            .credentials
            .get_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(
            password,
            &credential.password_hash,
            self.config.pepper.as_deref(),
        )? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let session = self.issue(credential.user_id, &credential.email)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());

        info!(
            user_id = %session.user_id,
            token = %token::fingerprint(&session.access_token),
            "Signed in"
        );
        self.notify(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> GabineteResult<()> {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(session) = previous {
            info!(user_id = %session.user_id, "Signed out");
            self.notify(SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn on_session_change(&self, listener: SessionListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }
}
