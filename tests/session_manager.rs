use std::sync::Arc;

use chrono::{Duration, Utc};

use authd::auth::verify_access_token;
use authd::configuration::AuthSettings;
use authd::error::AppError;
use authd::session::SessionManager;
use authd::store::{InMemoryStore, SessionStore};
use authd::sweeper::sweep_expired;

fn test_settings() -> AuthSettings {
    AuthSettings {
        signing_key: "integration-test-signing-key-32ch!".to_string(),
        password_salt: "integration-test-salt".to_string(),
        access_token_ttl_seconds: 3600,
        renewal_token_ttl_seconds: 86400,
        sweep_interval_seconds: 60,
    }
}

fn manager() -> (Arc<InMemoryStore>, SessionManager) {
    let store = Arc::new(InMemoryStore::new());
    let sessions = SessionManager::new(store.clone(), test_settings());
    (store, sessions)
}

#[tokio::test]
async fn authenticate_accepts_right_password_and_rejects_wrong_one() {
    let (_store, sessions) = manager();
    let id = sessions
        .create_account("alice", "correct horse")
        .await
        .expect("failed to create account");

    let account = sessions
        .authenticate("alice", "correct horse")
        .await
        .expect("authentication should succeed");
    assert_eq!(account.id, id);

    let result = sessions.authenticate("alice", "battery staple").await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn unknown_username_is_indistinguishable_from_wrong_password() {
    let (_store, sessions) = manager();
    sessions.create_account("alice", "pw").await.unwrap();

    let wrong_password = sessions.authenticate("alice", "nope").await;
    let unknown_user = sessions.authenticate("bob", "pw").await;

    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown_user, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn duplicate_sign_up_is_rejected() {
    let (_store, sessions) = manager();
    sessions.create_account("alice", "pw").await.unwrap();

    let result = sessions.create_account("alice", "other").await;
    assert!(matches!(result, Err(AppError::DuplicateAccount)));
}

#[tokio::test]
async fn repeated_issuance_leaves_exactly_one_renewal_token() {
    let (store, sessions) = manager();
    let id = sessions.create_account("alice", "pw").await.unwrap();

    sessions.issue_session(id).await.unwrap();
    sessions.issue_session(id).await.unwrap();
    let tokens = sessions.issue_session(id).await.unwrap();

    let rows = store.renewal_tokens_for(id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].token, tokens.renewal_token);
}

#[tokio::test]
async fn refresh_rotates_the_renewal_token() {
    let (store, sessions) = manager();
    let id = sessions.create_account("alice", "pw").await.unwrap();

    let first = sessions.issue_session(id).await.unwrap();
    let second = sessions
        .refresh_session(&first.renewal_token)
        .await
        .expect("refresh should succeed before expiry");

    assert_ne!(first.renewal_token, second.renewal_token);

    // The presented token was superseded, not merely copied over.
    let rows = store.renewal_tokens_for(id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].token, second.renewal_token);
}

#[tokio::test]
async fn old_token_is_invalid_after_rotation() {
    let (_store, sessions) = manager();
    let id = sessions.create_account("alice", "pw").await.unwrap();

    let first = sessions.issue_session(id).await.unwrap();
    sessions.refresh_session(&first.renewal_token).await.unwrap();

    let replay = sessions.refresh_session(&first.renewal_token).await;
    assert!(matches!(replay, Err(AppError::UnknownToken)));
}

#[tokio::test]
async fn unknown_renewal_token_is_rejected() {
    let (_store, sessions) = manager();

    let result = sessions.refresh_session("no-such-token").await;
    assert!(matches!(result, Err(AppError::UnknownToken)));
}

#[tokio::test]
async fn expired_renewal_token_is_rejected_even_before_the_sweep() {
    let (store, sessions) = manager();
    let id = sessions.create_account("alice", "pw").await.unwrap();

    store
        .insert_renewal_token(id, "stale-token", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    let result = sessions.refresh_session("stale-token").await;
    assert!(matches!(result, Err(AppError::ExpiredToken)));

    // The row is still physically present; rejection did not depend on the
    // sweeper having run.
    assert!(store.find_renewal_token("stale-token").await.is_ok());
}

#[tokio::test]
async fn concurrent_refreshes_of_the_same_token_leave_one_row() {
    let store = Arc::new(InMemoryStore::new());
    let sessions = Arc::new(SessionManager::new(store.clone(), test_settings()));

    let id = sessions.create_account("user7", "pw").await.unwrap();
    let issued = sessions.issue_session(id).await.unwrap();

    let first = {
        let sessions = sessions.clone();
        let token = issued.renewal_token.clone();
        tokio::spawn(async move { sessions.refresh_session(&token).await })
    };
    let second = {
        let sessions = sessions.clone();
        let token = issued.renewal_token.clone();
        tokio::spawn(async move { sessions.refresh_session(&token).await })
    };

    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    // At least one refresh wins; the loser either rotated again or found
    // the token already superseded. Either way the invariant holds.
    assert!(first.is_ok() || second.is_ok());
    let rows = store.renewal_tokens_for(id).await;
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn revoking_all_sessions_invalidates_outstanding_renewal_tokens() {
    let (store, sessions) = manager();
    let id = sessions.create_account("alice", "pw").await.unwrap();
    let tokens = sessions.issue_session(id).await.unwrap();

    sessions.revoke_all_sessions(id).await.unwrap();

    assert!(store.renewal_tokens_for(id).await.is_empty());
    let result = sessions.refresh_session(&tokens.renewal_token).await;
    assert!(matches!(result, Err(AppError::UnknownToken)));
}

#[tokio::test]
async fn sweep_removes_expired_and_keeps_live_tokens() {
    let (store, _sessions) = manager();

    store
        .insert_renewal_token(1, "expired", Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    store
        .insert_renewal_token(2, "live", Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    let removed = sweep_expired(store.as_ref()).await.expect("sweep failed");

    assert_eq!(removed, 1);
    assert!(store.find_renewal_token("live").await.is_ok());
    assert!(store.find_renewal_token("expired").await.is_err());
}

#[tokio::test]
async fn end_to_end_issued_access_token_carries_the_account_id() {
    let (_store, sessions) = manager();
    let settings = test_settings();

    let id = sessions.create_account("alice", "pw").await.unwrap();
    let account = sessions.authenticate("alice", "pw").await.unwrap();
    assert_eq!(account.id, id);

    let tokens = sessions.issue_session(account.id).await.unwrap();
    let claims = verify_access_token(&tokens.access_token, &settings)
        .expect("issued access token should verify");

    assert_eq!(claims.user_id().unwrap(), id);
    assert!(!claims.is_expired());
}
