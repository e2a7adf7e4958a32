use super::*;
use crate::storage::CredentialStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const ANALYTICS_TIERS: &[Tier] = &[Tier::Pro, Tier::Enterprise];

/// In-memory store that counts lookups.
#[derive(Default)]
struct MemoryStore {
    keys: Mutex<HashMap<String, Credential>>,
    lookups: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    fn with(credentials: Vec<Credential>) -> Arc<Self> {
        let keys = credentials.into_iter().map(|c| (c.id.clone(), c)).collect();
        Arc::new(Self {
            keys: Mutex::new(keys),
            ..Default::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    fn usage(&self, id: &str) -> i64 {
        self.keys.lock().unwrap()[id].usage_count
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_active(&self, token: &str) -> Result<Option<Credential>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        let keys = self.keys.lock().unwrap();
        Ok(keys.values().find(|c| c.token == token && c.active).cloned())
    }

    async fn increment_usage(&self, id: &str) -> Result<bool> {
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        let mut keys = self.keys.lock().unwrap();
        match keys.get_mut(id) {
            Some(c) if c.usage_count < c.usage_limit => {
                c.usage_count += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn credential(id: &str, tier: Tier, usage_count: i64, usage_limit: i64) -> Credential {
    Credential {
        id: id.to_string(),
        token: format!("olx_{}", id),
        name: "Default Key".to_string(),
        owner_id: "user-1".to_string(),
        owner_email: "user@example.com".to_string(),
        tier,
        usage_count,
        usage_limit,
        active: true,
        created_at: Utc::now(),
    }
}

fn gate(store: Arc<MemoryStore>) -> Gate {
    Gate::new(store, TierPolicy::default())
}

#[tokio::test]
async fn test_missing_header_skips_lookup() {
    let store = MemoryStore::with(vec![credential("k1", Tier::Free, 0, 50)]);
    let gate = gate(store.clone());

    assert_eq!(gate.authorize(None, None).await, Err(GateError::MissingCredential));
    assert_eq!(gate.authorize(Some(""), None).await, Err(GateError::MissingCredential));
    assert_eq!(gate.authorize(Some("   "), None).await, Err(GateError::MissingCredential));
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_and_inactive_look_the_same() {
    let mut inactive = credential("k1", Tier::Pro, 0, 2_000);
    inactive.active = false;
    let store = MemoryStore::with(vec![inactive]);
    let gate = gate(store);

    let unknown = gate.authorize(Some("olx_nope"), None).await.unwrap_err();
    let disabled = gate.authorize(Some("olx_k1"), None).await.unwrap_err();

    assert_eq!(unknown, GateError::InvalidCredential);
    assert_eq!(disabled, GateError::InvalidCredential);
    assert_eq!(
        serde_json::to_string(&unknown.body()).unwrap(),
        serde_json::to_string(&disabled.body()).unwrap()
    );
}

#[tokio::test]
async fn test_free_tier_rejected_from_restricted_endpoint() {
    let store = MemoryStore::with(vec![credential("k1", Tier::Free, 0, 50)]);
    let gate = gate(store);

    let err = gate.authorize(Some("olx_k1"), Some(ANALYTICS_TIERS)).await.unwrap_err();
    assert_eq!(err, GateError::TierInsufficient { current_tier: Tier::Free });
    assert_eq!(err.body().current_tier, Some(Tier::Free));
}

#[tokio::test]
async fn test_tier_checked_before_quota() {
    let store = MemoryStore::with(vec![credential("k1", Tier::Basic, 500, 500)]);
    let gate = gate(store);

    let err = gate.authorize(Some("olx_k1"), Some(ANALYTICS_TIERS)).await.unwrap_err();
    assert_eq!(err, GateError::TierInsufficient { current_tier: Tier::Basic });
}

#[tokio::test]
async fn test_quota_boundary() {
    let store = MemoryStore::with(vec![
        credential("full", Tier::Free, 50, 50),
        credential("last", Tier::Free, 49, 50),
    ]);
    let gate = gate(store.clone());

    let err = gate.authorize(Some("olx_full"), None).await.unwrap_err();
    assert_eq!(err, GateError::QuotaExceeded { limit: 50 });
    assert_eq!(err.body().limit, Some(50));

    let last = gate.authorize(Some("olx_last"), None).await.unwrap();
    assert_eq!(last.requests_remaining(), 0);
    gate.record_usage(&last.id).await;
    assert_eq!(store.usage("last"), 50);

    let err = gate.authorize(Some("olx_last"), None).await.unwrap_err();
    assert_eq!(err, GateError::QuotaExceeded { limit: 50 });
}

#[tokio::test]
async fn test_authorize_alone_does_not_count() {
    let store = MemoryStore::with(vec![credential("k1", Tier::Free, 3, 50)]);
    let gate = gate(store.clone());

    for _ in 0..25 {
        gate.authorize(Some("olx_k1"), None).await.unwrap();
    }
    assert_eq!(store.usage("k1"), 3);
}

#[tokio::test]
async fn test_fresh_free_key_lifecycle() {
    let store = MemoryStore::with(vec![credential("k1", Tier::Free, 0, 50)]);
    let gate = gate(store.clone());

    for call in 1..=50 {
        let credential = gate.authorize(Some("olx_k1"), None).await.unwrap();
        assert_eq!(credential.requests_remaining(), 50 - call);
        gate.record_usage(&credential.id).await;
    }

    assert_eq!(store.usage("k1"), 50);
    assert_eq!(
        gate.authorize(Some("olx_k1"), None).await,
        Err(GateError::QuotaExceeded { limit: 50 })
    );
}

#[tokio::test]
async fn test_live_values_are_read_each_call() {
    let store = MemoryStore::with(vec![credential("k1", Tier::Free, 50, 50)]);
    let gate = gate(store.clone());
    assert!(gate.authorize(Some("olx_k1"), None).await.is_err());

    {
        let mut keys = store.keys.lock().unwrap();
        let key = keys.get_mut("k1").unwrap();
        key.tier = Tier::Pro;
        key.usage_limit = 2_000;
    }

    let credential = gate.authorize(Some("olx_k1"), Some(ANALYTICS_TIERS)).await.unwrap();
    assert_eq!(credential.requests_remaining(), 1_949);
}

#[tokio::test]
async fn test_store_failure_fails_closed() {
    let gate = gate(MemoryStore::failing());

    let err = gate.authorize(Some("olx_k1"), None).await.unwrap_err();
    assert_eq!(err, GateError::Internal("store unavailable".to_string()));
}

#[tokio::test]
async fn test_record_usage_failure_is_swallowed() {
    let gate = gate(MemoryStore::failing());
    gate.record_usage("k1").await;

    let store = MemoryStore::with(vec![credential("k1", Tier::Free, 50, 50)]);
    let gate = Gate::new(store.clone(), TierPolicy::default());
    gate.record_usage("k1").await;
    gate.record_usage("missing").await;
    assert_eq!(store.usage("k1"), 50);
}

#[test]
fn test_generated_tokens() {
    let token = generate_token();
    assert!(token.starts_with(KEY_PREFIX));
    assert_eq!(token.len(), KEY_PREFIX.len() + 32);
    assert!(token[KEY_PREFIX.len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(generate_token(), token);
}
