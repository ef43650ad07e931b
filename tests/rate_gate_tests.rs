//! Integration tests for RateGate pacing.

use keyrelay::{PacingScope, RateGate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Pacing Tests
// ============================================================================

#[tokio::test]
async fn test_first_wait_is_immediate() {
    let gate = RateGate::new(Duration::from_secs(10));

    let start = Instant::now();
    gate.wait().await;
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_sequential_waits_are_spaced() {
    let gate = RateGate::new(INTERVAL);

    let start = Instant::now();
    gate.wait().await;
    gate.wait().await;
    gate.wait().await;

    assert!(start.elapsed() >= INTERVAL * 2);
}

#[tokio::test]
async fn test_zero_interval_does_not_pace() {
    let gate = RateGate::new(Duration::ZERO);

    let start = Instant::now();
    for _ in 0..100 {
        gate.wait().await;
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_concurrent_waits_are_spaced() {
    let gate = Arc::new(RateGate::new(INTERVAL));

    let start = Instant::now();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.wait().await;
                Instant::now()
            })
        })
        .collect();

    let mut starts = Vec::new();
    for handle in handles {
        starts.push(handle.await.unwrap());
    }
    starts.sort();

    // The n-th caller starts no earlier than n intervals after the first reservation
    for (n, started) in starts.iter().enumerate() {
        assert!(started.duration_since(start) >= INTERVAL * n as u32);
    }
}

#[tokio::test]
async fn test_idle_gate_does_not_accumulate_credit() {
    let gate = RateGate::new(INTERVAL);

    gate.wait().await;
    tokio::time::sleep(INTERVAL * 3).await;

    let start = Instant::now();
    gate.wait().await;
    gate.wait().await;
    assert!(start.elapsed() >= INTERVAL);
}

// ============================================================================
// PacingScope Tests
// ============================================================================

#[test]
fn test_pacing_scope_parse() {
    assert_eq!(PacingScope::parse("global"), Some(PacingScope::Global));
    assert_eq!(PacingScope::parse("GLOBAL"), Some(PacingScope::Global));
    assert_eq!(PacingScope::parse("per_provider"), Some(PacingScope::PerProvider));
    assert_eq!(PacingScope::parse("per-provider"), Some(PacingScope::PerProvider));
    assert_eq!(PacingScope::parse("sometimes"), None);
}

#[test]
fn test_pacing_scope_default() {
    assert_eq!(PacingScope::default(), PacingScope::Global);
}
