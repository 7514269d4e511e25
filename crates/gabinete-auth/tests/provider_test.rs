//! Integration tests for the password identity provider.

use std::sync::{Arc, Mutex};

use gabinete_auth::{AuthConfig, PasswordIdentityProvider};
use gabinete_core::error::GabineteError;
use gabinete_core::identity::IdentityProvider;
use gabinete_core::models::session::SessionEvent;
use gabinete_db::repository::SurrealCredentialRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Provider = PasswordIdentityProvider<SurrealCredentialRepository<Db>>;

async fn setup(config: AuthConfig) -> (Provider, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    gabinete_db::run_migrations(&db).await.unwrap();

    let provider = PasswordIdentityProvider::new(SurrealCredentialRepository::new(db), config);
    let user_id = Uuid::new_v4();
    provider
        .register(user_id, "chefe@camara.leg.br", "plenario-2026")
        .await
        .unwrap();
    (provider, user_id)
}

fn recorder(provider: &Provider) -> Arc<Mutex<Vec<SessionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    provider.on_session_change(Arc::new(move |event| sink.lock().unwrap().push(event)));
    events
}

#[tokio::test]
async fn sign_in_issues_session_and_notifies() {
    let (provider, user_id) = setup(AuthConfig::default()).await;
    let events = recorder(&provider);

    let session = provider
        .sign_in("chefe@camara.leg.br", "plenario-2026")
        .await
        .unwrap();
    assert_eq!(session.user_id, user_id);
    assert!(!session.is_expired());
    assert_eq!(
        provider.current_session().await.unwrap(),
        Some(session.clone())
    );
    assert_eq!(*events.lock().unwrap(), vec![SessionEvent::SignedIn(session)]);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let (provider, _) = setup(AuthConfig::default()).await;

    for (email, password) in [
        ("chefe@camara.leg.br", "wrong-password"),
        ("ninguem@camara.leg.br", "plenario-2026"),
    ] {
        let err = provider.sign_in(email, password).await.unwrap_err();
        assert!(
            matches!(err, GabineteError::AuthenticationFailed { ref reason } if reason == "invalid credentials")
        );
    }
    assert!(provider.current_session().await.unwrap().is_none());
}

#[tokio::test]
async fn weak_password_is_rejected_at_registration() {
    let (provider, _) = setup(AuthConfig::default()).await;
    let err = provider
        .register(Uuid::new_v4(), "fraco@camara.leg.br", "123")
        .await
        .unwrap_err();
    assert!(matches!(err, GabineteError::Validation { .. }));
}

#[tokio::test]
async fn sign_out_clears_and_notifies_once() {
    let (provider, _) = setup(AuthConfig::default()).await;
    provider
        .sign_in("chefe@camara.leg.br", "plenario-2026")
        .await
        .unwrap();
    let events = recorder(&provider);

    provider.sign_out().await.unwrap();
    provider.sign_out().await.unwrap();

    assert!(provider.current_session().await.unwrap().is_none());
    assert_eq!(*events.lock().unwrap(), vec![SessionEvent::SignedOut]);
}

#[tokio::test]
async fn refresh_rotates_token() {
    let (provider, _) = setup(AuthConfig::default()).await;
    let first = provider
        .sign_in("chefe@camara.leg.br", "plenario-2026")
        .await
        .unwrap();
    let events = recorder(&provider);

    let second = provider.refresh_session().await.unwrap();
    assert_eq!(second.user_id, first.user_id);
    assert_ne!(second.access_token, first.access_token);
    assert_eq!(
        *events.lock().unwrap(),
        vec![SessionEvent::TokenRefreshed(second)]
    );
}

#[tokio::test]
async fn expired_session_is_dropped() {
    let (provider, _) = setup(AuthConfig {
        session_lifetime_secs: 0,
        ..Default::default()
    })
    .await;
    provider
        .sign_in("chefe@camara.leg.br", "plenario-2026")
        .await
        .unwrap();
    let events = recorder(&provider);

    assert!(provider.current_session().await.unwrap().is_none());
    assert_eq!(*events.lock().unwrap(), vec![SessionEvent::SignedOut]);
    assert!(provider.refresh_session().await.is_err());
}

#[tokio::test]
async fn unsubscribed_listeners_are_not_called() {
    let (provider, _) = setup(AuthConfig::default()).await;
    let events = Arc::new(Mutex::new(0usize));
    let sink = events.clone();
    let id = provider.on_session_change(Arc::new(move |_| *sink.lock().unwrap() += 1));
    provider.unsubscribe(id);

    provider
        .sign_in("chefe@camara.leg.br", "plenario-2026")
        .await
        .unwrap();
    assert_eq!(*events.lock().unwrap(), 0);
}

#[tokio::test]
async fn out_of_range_lifetime_is_rejected_not_panicking() {
    for secs in [u64::MAX, i64::MAX as u64] {
        let (provider, _) = setup(AuthConfig {
            session_lifetime_secs: secs,
            ..Default::default()
        })
        .await;

        let err = provider
            .sign_in("chefe@camara.leg.br", "plenario-2026")
            .await
            .unwrap_err();
        assert!(matches!(err, GabineteError::Validation { .. }));
        assert!(provider.current_session().await.unwrap().is_none());
    }
}
