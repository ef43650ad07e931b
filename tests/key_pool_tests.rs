//! Integration tests for KeyPool rotation.

use keyrelay::{CredentialState, FailureReason, KeyPool, LlmError, ProviderType};
use std::time::Duration;

fn pool(keys: &[&str]) -> KeyPool {
    KeyPool::new(
        ProviderType::Mistral,
        keys.iter().map(|k| k.to_string()).collect(),
        Duration::from_secs(60),
        5,
    )
}

const RATE_LIMITED: FailureReason = FailureReason::RateLimited { retry_after: None };

// ============================================================================
// Selection Tests
// ============================================================================

#[tokio::test]
async fn test_round_robin_visits_every_key() {
    let pool = pool(&["k1", "k2", "k3"]);

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(pool.next().await.unwrap().secret().to_string());
    }
    assert_eq!(seen, vec!["k1", "k2", "k3"]);

    // Wraps around
    assert_eq!(pool.next().await.unwrap().secret(), "k1");
}

#[tokio::test]
async fn test_empty_pool_has_no_usable_credential() {
    let pool = pool(&[]);

    assert!(pool.is_empty().await);
    match pool.next().await {
        Err(LlmError::NoUsableCredential(provider)) => assert_eq!(provider, ProviderType::Mistral),
        other => panic!("expected NoUsableCredential, got {:?}", other),
    }
}

#[tokio::test]
async fn test_credential_index_matches_position() {
    let pool = pool(&["k1", "k2"]);

    assert_eq!(pool.next().await.unwrap().index(), 0);
    assert_eq!(pool.next().await.unwrap().index(), 1);
}

// ============================================================================
// Failure Handling Tests
// ============================================================================

#[tokio::test]
async fn test_rate_limited_key_is_skipped() {
    let pool = pool(&["k1", "k2"]);

    let first = pool.next().await.unwrap();
    pool.mark_failure(&first, RATE_LIMITED).await;

    for _ in 0..3 {
        assert_eq!(pool.next().await.unwrap().secret(), "k2");
    }

    let stats = pool.stats().await;
    assert!(matches!(stats[0].state, CredentialState::CoolingDown { .. }));
    assert_eq!(stats[1].state, CredentialState::Available);
}

#[tokio::test]
async fn test_cooldown_expires() {
    let pool = KeyPool::new(
        ProviderType::Gemini,
        vec!["k1".to_string()],
        Duration::from_millis(50),
        5,
    );

    let credential = pool.next().await.unwrap();
    pool.mark_failure(&credential, RATE_LIMITED).await;
    assert!(pool.next().await.is_err());

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(pool.next().await.unwrap().secret(), "k1");
    assert_eq!(pool.stats().await[0].state, CredentialState::Available);
}

#[tokio::test]
async fn test_retry_after_overrides_cooldown() {
    let pool = KeyPool::new(
        ProviderType::Mistral,
        vec!["k1".to_string()],
        Duration::from_secs(3600),
        5,
    );

    let credential = pool.next().await.unwrap();
    pool.mark_failure(
        &credential,
        FailureReason::RateLimited { retry_after: Some(Duration::from_millis(30)) },
    )
    .await;
    assert_eq!(pool.usable_count().await, 0);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(pool.usable_count().await, 1);
}

#[tokio::test]
async fn test_auth_failure_exhausts_key() {
    let pool = pool(&["k1", "k2"]);

    let first = pool.next().await.unwrap();
    pool.mark_failure(&first, FailureReason::AuthFailed).await;

    assert_eq!(pool.stats().await[0].state, CredentialState::Exhausted);
    assert_eq!(pool.next().await.unwrap().secret(), "k2");
    assert_eq!(pool.next().await.unwrap().secret(), "k2");
}

#[tokio::test]
async fn test_all_exhausted_reports_no_usable_credential() {
    let pool = pool(&["k1", "k2"]);

    for _ in 0..2 {
        let credential = pool.next().await.unwrap();
        pool.mark_failure(&credential, FailureReason::AuthFailed).await;
    }

    assert_eq!(pool.usable_count().await, 0);
    assert!(matches!(pool.next().await, Err(LlmError::NoUsableCredential(_))));
}

#[tokio::test]
async fn test_transient_failures_promote_to_exhausted() {
    let pool = KeyPool::new(ProviderType::OpenRouter, vec!["k1".to_string()], Duration::from_secs(60), 3);

    for _ in 0..2 {
        let credential = pool.next().await.unwrap();
        pool.mark_failure(&credential, FailureReason::Transient).await;
    }
    // Two transient failures leave the key in rotation
    assert_eq!(pool.stats().await[0].state, CredentialState::Available);
    assert_eq!(pool.stats().await[0].failure_streak, 2);

    let credential = pool.next().await.unwrap();
    pool.mark_failure(&credential, FailureReason::Transient).await;
    assert_eq!(pool.stats().await[0].state, CredentialState::Exhausted);
}

#[tokio::test]
async fn test_success_resets_failure_streak() {
    let pool = KeyPool::new(ProviderType::OpenRouter, vec!["k1".to_string()], Duration::from_secs(60), 3);

    for _ in 0..2 {
        let credential = pool.next().await.unwrap();
        pool.mark_failure(&credential, FailureReason::Transient).await;
    }
    let credential = pool.next().await.unwrap();
    pool.mark_success(&credential).await;

    let stats = pool.stats().await;
    assert_eq!(stats[0].failure_streak, 0);
    assert_eq!(stats[0].error_count, 2);
    assert_eq!(stats[0].request_count, 3);

    let credential = pool.next().await.unwrap();
    pool.mark_failure(&credential, FailureReason::Transient).await;
    assert_eq!(pool.stats().await[0].state, CredentialState::Available);
}

#[tokio::test]
async fn test_zero_exhaust_after_never_promotes() {
    let pool = KeyPool::new(ProviderType::HuggingFace, vec!["k1".to_string()], Duration::from_secs(60), 0);

    for _ in 0..10 {
        let credential = pool.next().await.unwrap();
        pool.mark_failure(&credential, FailureReason::Transient).await;
    }
    assert_eq!(pool.usable_count().await, 1);
}

#[tokio::test]
async fn test_usable_count_tracks_cooldowns() {
    let pool = KeyPool::new(
        ProviderType::Mistral,
        vec!["k1".to_string(), "k2".to_string(), "k3".to_string()],
        Duration::from_millis(40),
        5,
    );

    let first = pool.next().await.unwrap();
    pool.mark_failure(&first, RATE_LIMITED).await;
    let second = pool.next().await.unwrap();
    pool.mark_failure(&second, FailureReason::AuthFailed).await;
    assert_eq!(pool.usable_count().await, 1);

    tokio::time::sleep(Duration::from_millis(70)).await;

    // The cooled-down key is back, the rejected one is not
    assert_eq!(pool.usable_count().await, 2);
    assert_eq!(pool.stats().await[0].state, CredentialState::Available);
}

#[tokio::test]
async fn test_huge_configured_cooldown_is_capped() {
    let pool = KeyPool::new(
        ProviderType::Mistral,
        vec!["k1".to_string(), "k2".to_string()],
        Duration::from_secs(u64::MAX),
        5,
    );

    let credential = pool.next().await.unwrap();
    pool.mark_failure(&credential, RATE_LIMITED).await;

    assert!(matches!(pool.stats().await[0].state, CredentialState::CoolingDown { .. }));
    assert_eq!(pool.next().await.unwrap().secret(), "k2");
}

#[tokio::test]
async fn test_huge_retry_after_is_capped() {
    let pool = pool(&["k1"]);

    let credential = pool.next().await.unwrap();
    pool.mark_failure(
        &credential,
        FailureReason::RateLimited { retry_after: Some(Duration::MAX) },
    )
    .await;

    assert_eq!(pool.usable_count().await, 0);
}

// ============================================================================
// Rebuild Tests
// ============================================================================

#[tokio::test]
async fn test_rebuild_replaces_keys() {
    let pool = pool(&["old1", "old2"]);
    let _ = pool.next().await.unwrap();

    pool.rebuild(vec!["new1".to_string()]).await;

    assert_eq!(pool.len().await, 1);
    assert_eq!(pool.next().await.unwrap().secret(), "new1");
}

#[tokio::test]
async fn test_rebuild_ignores_stale_lease() {
    let pool = pool(&["old1", "old2"]);
    let stale = pool.next().await.unwrap();

    pool.rebuild(vec!["new1".to_string(), "new2".to_string()]).await;
    pool.mark_failure(&stale, FailureReason::AuthFailed).await;

    assert_eq!(pool.usable_count().await, 2);
    let stats = pool.stats().await;
    assert_eq!(stats[0].error_count, 0);
    assert_eq!(stats[0].state, CredentialState::Available);
}

#[tokio::test]
async fn test_stats_are_redacted() {
    let pool = pool(&["sk-very-secret-0001"]);

    let stats = pool.stats().await;
    assert_eq!(stats[0].fingerprint, "****0001");
    assert!(stats[0].last_used.is_none());
}
