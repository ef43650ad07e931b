use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::constants;
use crate::errors::{AdapterError, AdapterErrorKind, LlmError, LlmResult};
use crate::providers::ProviderType;

/// Availability of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Available,
    CoolingDown { until: Instant },
    Exhausted,
}

/// Why a call made with a key failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Cool the key down, for `retry_after` if the provider said how long
    RateLimited { retry_after: Option<Duration> },
    /// Retire the key
    AuthFailed,
    /// Count against the key but keep it available
    Transient,
}

impl FailureReason {
    /// Map an adapter error onto a pool failure; `Invalid` is not the key's fault
    pub fn from_adapter_error(err: &AdapterError) -> Option<Self> {
        match err.kind {
            AdapterErrorKind::RateLimited => Some(FailureReason::RateLimited { retry_after: err.retry_after }),
            AdapterErrorKind::AuthFailed => Some(FailureReason::AuthFailed),
            AdapterErrorKind::Transient => Some(FailureReason::Transient),
            AdapterErrorKind::Invalid => None,
        }
    }
}

/// A key selected for one call
///
/// The lease only reads the secret; nothing is held while the call runs.
#[derive(Clone)]
pub struct Credential {
    index: usize,
    generation: u64,
    secret: Arc<str>,
}

impl Credential {
    /// Position of the key in its pool
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Redacted form safe for logs
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.secret)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("index", &self.index)
            .field("secret", &self.fingerprint())
            .finish()
    }
}

fn max_cooldown() -> Duration {
    Duration::from_secs(constants::MAX_COOLDOWN_SECS)
}

fn fingerprint(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Snapshot of one key for monitoring
#[derive(Debug, Clone)]
pub struct CredentialStats {
    pub index: usize,
    pub fingerprint: String,
    pub state: CredentialState,
    pub failure_streak: u32,
    pub request_count: usize,
    pub error_count: usize,
    pub last_used: Option<Instant>,
}

struct CredentialSlot {
    secret: Arc<str>,
    state: CredentialState,
    failure_streak: u32,
    request_count: usize,
    error_count: usize,
    last_used: Option<Instant>,
}

impl CredentialSlot {
    fn new(secret: String) -> Self {
        Self {
            secret: secret.into(),
            state: CredentialState::Available,
            failure_streak: 0,
            request_count: 0,
            error_count: 0,
            last_used: None,
        }
    }

    /// Lapsed cooldowns turn back into `Available` here
    fn is_usable(&mut self, now: Instant) -> bool {
        match self.state {
            CredentialState::Available => true,
            CredentialState::CoolingDown { until } if until <= now => {
                self.state = CredentialState::Available;
                true
            }
            CredentialState::CoolingDown { .. } | CredentialState::Exhausted => false,
        }
    }
}

struct PoolState {
    slots: Vec<CredentialSlot>,
    cursor: usize,
    generation: u64,
}

/// Rotation-managed keys for one provider
///
/// Selection is round-robin from the cursor. The lock is held only while the slots
/// are inspected or updated.
pub struct KeyPool {
    provider: ProviderType,
    cooldown: Duration,
    /// Consecutive failures that retire a key; 0 disables promotion
    exhaust_after: u32,
    state: Mutex<PoolState>,
}

impl KeyPool {
    pub fn new(provider: ProviderType, keys: Vec<String>, cooldown: Duration, exhaust_after: u32) -> Self {
        Self {
            provider,
            cooldown,
            exhaust_after,
            state: Mutex::new(PoolState {
                slots: keys.into_iter().map(CredentialSlot::new).collect(),
                cursor: 0,
                generation: 0,
            }),
        }
    }

    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Select the next usable key
    ///
    /// # Returns
    /// * The first available key at or after the cursor, or `NoUsableCredential` when
    ///   every key is cooling down or exhausted (including an empty pool)
    pub async fn next(&self) -> LlmResult<Credential> {
        let mut state = self.state.lock().await;
        let len = state.slots.len();
        let now = Instant::now();

        for offset in 0..len {
            let index = (state.cursor + offset) % len;
            if !state.slots[index].is_usable(now) {
                continue;
            }

            state.cursor = (index + 1) % len;
            let generation = state.generation;
            let slot = &mut state.slots[index];
            slot.request_count += 1;
            slot.last_used = Some(now);

            debug!("KeyPool {}: selected key #{} ({})", self.provider, index, fingerprint(&slot.secret));
            return Ok(Credential { index, generation, secret: slot.secret.clone() });
        }

        debug!("KeyPool {}: none of {} key(s) usable", self.provider, len);
        Err(LlmError::NoUsableCredential(self.provider))
    }

    /// Record a failed call made with `credential`
    ///
    /// Leases from before a [`rebuild`](Self::rebuild) are ignored.
    pub async fn mark_failure(&self, credential: &Credential, reason: FailureReason) {
        let mut state = self.state.lock().await;
        if credential.generation != state.generation || credential.index >= state.slots.len() {
            debug!("KeyPool {}: ignoring failure for stale lease #{}", self.provider, credential.index);
            return;
        }

        let len = state.slots.len();
        let slot = &mut state.slots[credential.index];
        slot.error_count += 1;
        slot.failure_streak += 1;

        #[cfg(feature = "metrics")]
        let was_exhausted = slot.state == CredentialState::Exhausted;
        match reason {
            FailureReason::RateLimited { retry_after } => {
                let rest = retry_after.unwrap_or(self.cooldown).min(max_cooldown());
                let now = Instant::now();
                let until = now.checked_add(rest).unwrap_or(now);
                let until = match slot.state {
                    CredentialState::CoolingDown { until: current } if current > until => current,
                    _ => until,
                };
                if slot.state != CredentialState::Exhausted {
                    slot.state = CredentialState::CoolingDown { until };
                }
                debug!("KeyPool {}: key #{} cooling down", self.provider, credential.index);
            }
            FailureReason::AuthFailed => {
                slot.state = CredentialState::Exhausted;
                warn!("KeyPool {}: key #{} rejected, marked exhausted", self.provider, credential.index);
            }
            FailureReason::Transient => {}
        }

        if self.exhaust_after > 0
            && slot.failure_streak >= self.exhaust_after
            && slot.state != CredentialState::Exhausted
        {
            slot.state = CredentialState::Exhausted;
            warn!(
                "KeyPool {}: key #{} failed {} times in a row, marked exhausted",
                self.provider, credential.index, slot.failure_streak
            );
        }

        #[cfg(feature = "metrics")]
        if !was_exhausted && slot.state == CredentialState::Exhausted {
            crate::metrics::record_credential_exhausted(self.provider);
        }

        if state.cursor == credential.index {
            state.cursor = (credential.index + 1) % len;
        }
    }

    /// Record a successful call; clears the failure streak
    pub async fn mark_success(&self, credential: &Credential) {
        let mut state = self.state.lock().await;
        if credential.generation != state.generation {
            return;
        }
        if let Some(slot) = state.slots.get_mut(credential.index) {
            slot.failure_streak = 0;
        }
    }

    /// Replace every key, e.g. after a configuration reload
    pub async fn rebuild(&self, keys: Vec<String>) {
        let mut state = self.state.lock().await;
        state.slots = keys.into_iter().map(CredentialSlot::new).collect();
        state.cursor = 0;
        state.generation += 1;
        debug!("KeyPool {}: rebuilt with {} key(s)", self.provider, state.slots.len());
    }

    /// Number of keys that could be selected right now
    pub async fn usable_count(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        state.slots.iter_mut().map(|slot| slot.is_usable(now)).filter(|usable| *usable).count()
    }

    pub async fn stats(&self) -> Vec<CredentialStats> {
        let state = self.state.lock().await;
        state
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| CredentialStats {
                index,
                fingerprint: fingerprint(&slot.secret),
                state: slot.state,
                failure_streak: slot.failure_streak,
                request_count: slot.request_count,
                error_count: slot.error_count,
                last_used: slot.last_used,
            })
            .collect()
    }
}
