//! Session/identity holder.
//!
//! Owns the authentication state machine
//! (`Uninitialized -> Loading -> {Authenticated, Anonymous}`) and is the
//! single writer of the profile and effective permission set that gate
//! consumers read.
//!
//! Every identity change bumps an epoch. A load only publishes its
//! result if the epoch it started under is still current, so a late
//! load can never resurrect a session that was logged out or replaced
//! in the meantime.

use std::sync::{Arc, Mutex, PoisonError};

use gabinete_core::error::GabineteResult;
use gabinete_core::identity::{IdentityProvider, SubscriptionId};
use gabinete_core::models::profile::Profile;
use gabinete_core::models::session::{IdentitySession, SessionEvent};
use gabinete_core::repository::{PermissionRepository, ProfileRepository, UserOverrideRepository};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gate::PermissionGate;
use crate::permissions::EffectivePermissionSet;
use crate::resolver::PermissionResolver;
use crate::state::{AuthContext, AuthState};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    epoch: u64,
    /// Session whose profile and permissions are being loaded.
    loading: Option<IdentitySession>,
    /// Token of the session most recently ended by `logout`. The
    /// provider may still report it until its sign-out completes.
    ended: Option<String>,
    state: AuthState,
}

/// Outcome of trying to take ownership of a load for a session.
enum Claim {
    /// Already authenticated as this identity.
    Current,
    /// Another caller is loading this identity.
    Joined,
    /// This caller must load under the given epoch.
    Begun(u64),
    /// The session was already ended, or the state moved on since the
    /// caller looked.
    Stale,
}

struct Inner<I, P, G, O> {
    identity: I,
    resolver: PermissionResolver<P, G, O>,
    state: watch::Sender<Snapshot>,
}

impl<I, P, G, O> Inner<I, P, G, O>
where
    I: IdentityProvider + 'static,
    P: ProfileRepository + 'static,
    G: PermissionRepository + 'static,
    O: UserOverrideRepository + 'static,
{
    fn current(&self) -> AuthState {
        self.state.borrow().state.clone()
    }

    fn clear(&self) {
        self.state.send_modify(|snap| {
            let held = match &snap.state {
                AuthState::Authenticated(ctx) => Some(&ctx.session),
                _ => snap.loading.as_ref(),
            };
            if let Some(token) = held.map(|session| session.access_token.clone()) {
                snap.ended = Some(token);
            }
            snap.epoch += 1;
            snap.loading = None;
            snap.state = AuthState::Anonymous;
        });
    }

    /// Clear if an identity is held or being loaded and nothing changed
    /// since `epoch`. A notification must not end a login that started
    /// after the provider was asked.
    fn drop_session(&self, epoch: u64) {
        let dropped = self.state.send_if_modified(|snap| {
            let holds_identity = snap.epoch == epoch
                && (snap.state.is_authenticated() || snap.loading.is_some());
            if holds_identity {
                snap.epoch += 1;
                snap.loading = None;
                snap.state = AuthState::Anonymous;
            }
            holds_identity
        });
        if dropped {
            info!("Session ended by the identity provider");
        }
    }

    fn claim(&self, session: &IdentitySession, expected: Option<u64>) -> Claim {
        let mut claim = Claim::Joined;
        self.state.send_if_modified(|snap| {
            let superseded = expected.is_some_and(|epoch| epoch != snap.epoch);
            if superseded || snap.ended.as_deref() == Some(session.access_token.as_str()) {
                claim = Claim::Stale;
                return false;
            }
            if snap.loading.as_ref().map(|s| s.user_id) == Some(session.user_id) {
                return false;
            }
            if let AuthState::Authenticated(ctx) = &mut snap.state {
                if ctx.session.user_id == session.user_id {
                    claim = Claim::Current;
                    if ctx.session == *session {
                        return false;
                    }
                    ctx.session = session.clone();
                    return true;
                }
            }
            snap.epoch += 1;
            snap.loading = Some(session.clone());
            snap.state = AuthState::Loading;
            claim = Claim::Begun(snap.epoch);
            true
        });
        claim
    }

    /// Publish `context` if no identity change happened since `epoch`.
    fn commit(&self, epoch: u64, context: AuthContext) -> bool {
        let user_id = context.session.user_id;
        let committed = self.state.send_if_modified(|snap| {
            if snap.epoch != epoch {
                return false;
            }
            snap.loading = None;
            snap.state = AuthState::Authenticated(context);
            true
        });
        if committed {
            info!(%user_id, "Authenticated");
        } else {
            debug!(%user_id, "Discarding load for a superseded session");
        }
        committed
    }

    /// Load profile and permissions, failing closed: any error leaves
    /// the identity without a profile or without permissions.
    async fn load(&self, user_id: Uuid) -> (Option<Profile>, EffectivePermissionSet) {
        let profile = match self.resolver.profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(%user_id, "Authenticated identity has no profile");
                return (None, EffectivePermissionSet::empty());
            }
            Err(e) => {
                warn!(%user_id, error = %e, "Profile failed to load; granting nothing");
                return (None, EffectivePermissionSet::empty());
            }
        };

        match self.resolver.resolve_for_profile(&profile).await {
            Ok(permissions) => (Some(profile), permissions),
            Err(e) => {
                warn!(%user_id, error = %e, "Permissions failed to resolve; granting nothing");
                (Some(profile), EffectivePermissionSet::empty())
            }
        }
    }

    async fn wait_while_loading(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|snap| !matches!(snap.state, AuthState::Loading))
            .await
            .map(|snap| snap.state.clone());
        settled.unwrap_or_else(|_| self.current())
    }

    /// Move to `Authenticated` for `session`, loading profile and
    /// permissions first. Idempotent per identity. With `expected`, the
    /// session is ignored if the epoch has moved past it.
    async fn establish(
        self: &Arc<Self>,
        session: IdentitySession,
        expected: Option<u64>,
    ) -> AuthState {
        let epoch = match self.claim(&session, expected) {
            Claim::Stale => {
                debug!(user_id = %session.user_id, "Ignoring stale session");
                return self.current();
            }
            Claim::Current => return self.current(),
            Claim::Joined => return self.wait_while_loading().await,
            Claim::Begun(epoch) => epoch,
        };
        debug!(user_id = %session.user_id, epoch, "Loading identity");

        // The load runs as its own task so a caller that gives up
        // cannot leave the state stuck in Loading.
        let inner = Arc::clone(self);
        let loading = session.clone();
        let task = tokio::spawn(async move {
            let (profile, permissions) = inner.load(loading.user_id).await;
            inner.commit(
                epoch,
                AuthContext {
                    session: loading,
                    profile,
                    permissions: Arc::new(permissions),
                },
            );
        });

        if let Err(e) = task.await {
            warn!(error = %e, "Identity load aborted; granting nothing");
            self.commit(
                epoch,
                AuthContext {
                    session,
                    profile: None,
                    permissions: Arc::new(EffectivePermissionSet::empty()),
                },
            );
        }

        self.wait_while_loading().await
    }

    /// Reconcile with the provider after a change notification. The
    /// provider's current session is authoritative; the event payload
    /// is only used if the provider cannot be asked.
    async fn handle(self: &Arc<Self>, event: SessionEvent) {
        let epoch = self.state.borrow().epoch;
        let session = match self.identity.current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Could not confirm session change; using the event");
                event.session().cloned()
            }
        };

        match session {
            Some(session) => {
                self.establish(session, Some(epoch)).await;
            }
            None => self.drop_session(epoch),
        }
    }
}

struct Listener {
    subscription: SubscriptionId,
    worker: JoinHandle<()>,
}

/// Process-wide authentication/authorization state, passed explicitly
/// to whoever needs it.
///
/// Call [`init`](Self::init) once inside a Tokio runtime to subscribe to
/// the identity provider and load the current session;
/// [`teardown`](Self::teardown) (or dropping the holder) unsubscribes.
pub struct SessionHolder<I, P, G, O>
where
    I: IdentityProvider + 'static,
    P: ProfileRepository + 'static,
    G: PermissionRepository + 'static,
    O: UserOverrideRepository + 'static,
{
    inner: Arc<Inner<I, P, G, O>>,
    listener: Mutex<Option<Listener>>,
}

impl<I, P, G, O> SessionHolder<I, P, G, O>
where
    I: IdentityProvider + 'static,
    P: ProfileRepository + 'static,
    G: PermissionRepository + 'static,
    O: UserOverrideRepository + 'static,
{
    pub fn new(identity: I, resolver: PermissionResolver<P, G, O>) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(Inner {
                identity,
                resolver,
                state,
            }),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to provider notifications, then resolve the provider's
    /// current session. Returns the settled state.
    pub async fn init(&self) -> AuthState {
        // Subscribe first so a change racing the lookup is not lost.
        self.listen();

        let mut epoch = 0;
        self.inner.state.send_modify(|snap| {
            snap.epoch += 1;
            snap.loading = None;
            snap.state = AuthState::Loading;
            epoch = snap.epoch;
        });

        let session = match self.inner.identity.current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Could not read the current session");
                None
            }
        };

        match session {
            Some(session) => self.inner.establish(session, None).await,
            None => {
                self.inner.state.send_if_modified(|snap| {
                    if snap.epoch != epoch {
                        return false;
                    }
                    snap.state = AuthState::Anonymous;
                    true
                });
                self.wait_until_settled().await
            }
        }
    }

    fn listen(&self) {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }

        // The provider's callback only enqueues; the worker does the
        // awaiting.
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
        let subscription = self.inner.identity.on_session_change(Arc::new(move |event| {
            if tx.send(event).is_err() {
                debug!("Session change after teardown ignored");
            }
        }));

        let inner = Arc::clone(&self.inner);
        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                inner.handle(event).await;
            }
        });

        *slot = Some(Listener {
            subscription,
            worker,
        });
    }

    /// Unsubscribe from the provider and return to `Uninitialized`.
    pub fn teardown(&self) {
        self.stop_listening();
        self.inner.state.send_modify(|snap| {
            snap.epoch += 1;
            snap.loading = None;
            snap.state = AuthState::Uninitialized;
        });
    }

    fn stop_listening(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            self.inner.identity.unsubscribe(listener.subscription);
            listener.worker.abort();
        }
    }

    /// Sign in and load the identity. Credential errors surface to the
    /// caller and leave the state untouched; load failures do not
    /// surface and yield an `Authenticated` state that grants nothing.
    pub async fn login(&self, email: &str, password: &str) -> GabineteResult<AuthState> {
        let session = self
            .inner
            .identity
            .sign_in(email, password)
            .await
            .inspect_err(|e| info!(error = %e, "Login rejected"))?;

        Ok(self.inner.establish(session, None).await)
    }

    /// Clear the state, then end the provider session. The state is
    /// `Anonymous` even if the provider call fails.
    pub async fn logout(&self) -> GabineteResult<()> {
        self.inner.clear();
        info!("Logged out");
        self.inner.identity.sign_out().await
    }

    /// Reload profile and permissions for the current identity.
    ///
    /// Fetch errors propagate and keep the previous state. A refresh
    /// that completes after a logout or identity change is discarded.
    pub async fn refresh(&self) -> GabineteResult<AuthState> {
        let (epoch, user_id) = {
            let snap = self.inner.state.borrow();
            match &snap.state {
                AuthState::Authenticated(ctx) => (snap.epoch, ctx.session.user_id),
                other => return Ok(other.clone()),
            }
        };

        let profile = self.inner.resolver.profile(user_id).await?;
        let permissions = match &profile {
            Some(profile) => self.inner.resolver.resolve_for_profile(profile).await?,
            None => EffectivePermissionSet::empty(),
        };

        let applied = self.inner.state.send_if_modified(|snap| {
            if snap.epoch != epoch {
                return false;
            }
            match &mut snap.state {
                AuthState::Authenticated(ctx) if ctx.session.user_id == user_id => {
                    ctx.profile = profile;
                    ctx.permissions = Arc::new(permissions);
                    true
                }
                _ => false,
            }
        });
        if applied {
            debug!(%user_id, "Permissions refreshed");
        } else {
            debug!(%user_id, "Discarding refresh for a superseded session");
        }

        Ok(self.state())
    }

    pub fn state(&self) -> AuthState {
        self.inner.current()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.inner.state.borrow().state.profile().cloned()
    }

    /// Gate over the currently published permission set.
    pub fn gate(&self) -> PermissionGate {
        self.inner.state.borrow().state.gate()
    }

    /// Wait until the state is `Anonymous` or `Authenticated`.
    pub async fn wait_until_settled(&self) -> AuthState {
        let mut rx = self.inner.state.subscribe();
        let settled = rx
            .wait_for(|snap| snap.state.is_settled())
            .await
            .map(|snap| snap.state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Observe state changes.
    pub fn watch(&self) -> StateWatch {
        StateWatch {
            rx: self.inner.state.subscribe(),
        }
    }

    pub fn identity(&self) -> &I {
        &self.inner.identity
    }
}

impl<I, P, G, O> Drop for SessionHolder<I, P, G, O>
where
    I: IdentityProvider + 'static,
    P: ProfileRepository + 'static,
    G: PermissionRepository + 'static,
    O: UserOverrideRepository + 'static,
{
    fn drop(&mut self) {
        self.stop_listening();
    }
}

/// Receiver side of the holder's state.
pub struct StateWatch {
    rx: watch::Receiver<Snapshot>,
}

impl StateWatch {
    pub fn current(&self) -> AuthState {
        self.rx.borrow().state.clone()
    }

    /// The next published state, `None` once the holder is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().state.clone())
    }
}
