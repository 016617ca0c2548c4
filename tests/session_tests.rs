use std::time::Duration;

use anyhow::Result;

use cardsmith::plans::Plan;
use cardsmith::session::{
    load_session, save_session, InMemorySessionStore, SessionStatus, SessionStore, UserSession,
};

/// A user with no stored session loads as None
#[tokio::test]
async fn test_missing_session_loads_as_none() -> Result<()> {
    let store = InMemorySessionStore::new();

    assert!(load_session(&store, 42).await?.is_none());

    Ok(())
}

/// Free activation persists an active free session with the full quota
#[tokio::test]
async fn test_free_activation_round_trip() -> Result<()> {
    let store = InMemorySessionStore::new();

    save_session(&store, 42, &UserSession::fresh_free(5)).await?;

    let session = load_session(&store, 42)
        .await?
        .ok_or_else(|| anyhow::anyhow!("session not stored"))?;
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.plan, Plan::Free);
    assert_eq!(session.activations_left, 5);

    Ok(())
}

/// Sessions are stored per user, not globally
#[tokio::test]
async fn test_sessions_are_keyed_by_user() -> Result<()> {
    let store = InMemorySessionStore::new();

    save_session(&store, 1, &UserSession::fresh_free(5)).await?;
    save_session(&store, 2, &UserSession::paid(Plan::Pro)).await?;

    let first = load_session(&store, 1).await?.map(|s| s.plan);
    let second = load_session(&store, 2).await?.map(|s| s.plan);
    assert_eq!(first, Some(Plan::Free));
    assert_eq!(second, Some(Plan::Pro));

    Ok(())
}

/// Five generations exhaust the free quota; the sixth would be refused
#[tokio::test]
async fn test_free_quota_exhaustion_sequence() -> Result<()> {
    let store = InMemorySessionStore::new();
    save_session(&store, 42, &UserSession::fresh_free(5)).await?;

    for expected_left in (0..5).rev() {
        let mut session = load_session(&store, 42)
            .await?
            .ok_or_else(|| anyhow::anyhow!("session disappeared"))?;
        assert!(!session.quota_exhausted());
        session.consume_activation();
        assert_eq!(session.activations_left, expected_left);
        save_session(&store, 42, &session).await?;
    }

    let session = load_session(&store, 42)
        .await?
        .ok_or_else(|| anyhow::anyhow!("session disappeared"))?;
    assert!(session.quota_exhausted());

    Ok(())
}

/// The counter never goes below zero
#[tokio::test]
async fn test_consume_activation_floors_at_zero() -> Result<()> {
    let mut session = UserSession::fresh_free(1);
    session.consume_activation();
    session.consume_activation();
    assert_eq!(session.activations_left, 0);

    Ok(())
}

/// Paid plans never hit the quota check
#[tokio::test]
async fn test_paid_sessions_are_never_exhausted() -> Result<()> {
    let mut session = UserSession::paid(Plan::Basic);
    session.consume_activation();
    assert!(!session.quota_exhausted());
    assert_eq!(session.activations_left, 0);

    Ok(())
}

/// Selecting the free plan from the menu and pressing the demo button
/// produce identical sessions
#[tokio::test]
async fn test_free_plan_selection_matches_demo_activation() -> Result<()> {
    let via_demo = UserSession::fresh_free(5);
    let via_menu = UserSession::fresh_free(5);

    assert_eq!(via_demo.status, via_menu.status);
    assert_eq!(via_demo.plan, via_menu.plan);
    assert_eq!(via_demo.activations_left, via_menu.activations_left);

    Ok(())
}

/// Expired entries behave exactly like missing ones
#[tokio::test]
async fn test_expired_entry_reads_as_missing() -> Result<()> {
    let store = InMemorySessionStore::new();
    store
        .put("session:42", "{}".to_string(), Duration::from_secs(0))
        .await?;

    assert!(store.fetch("session:42").await?.is_none());

    Ok(())
}

/// A corrupt stored record is discarded instead of crashing the handler
#[tokio::test]
async fn test_corrupt_record_is_discarded() -> Result<()> {
    let store = InMemorySessionStore::new();
    store
        .put(
            "session:42",
            "not json at all".to_string(),
            Duration::from_secs(60),
        )
        .await?;

    assert!(load_session(&store, 42).await?.is_none());

    Ok(())
}
