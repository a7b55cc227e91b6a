//! Token store contract checks, exercised through the in-process
//! implementation. The Postgres store mirrors these semantics
//! query-for-query.

use chrono::{Duration, Utc};
use session_tokens::repositories::{find_by_recaller, MemoryTokenStore, TokenStore};

#[tokio::test]
async fn save_persists_touch_mutations() {
    let store = MemoryTokenStore::new();
    let mut token = store
        .create(1, Some("192.0.2.1"), Some("agent/1"))
        .await
        .expect("create");

    token.ip_address = Some("192.0.2.2".to_string());
    token.user_agent = Some("agent/2".to_string());
    token.updated_at = Utc::now() + Duration::seconds(5);
    store.save(&token).await.expect("save");

    let stored = store
        .find_live_by_id(token.id)
        .await
        .expect("lookup")
        .expect("live token");
    assert_eq!(stored.ip_address.as_deref(), Some("192.0.2.2"));
    assert_eq!(stored.user_agent.as_deref(), Some("agent/2"));
    assert_eq!(stored.updated_at, token.updated_at);
}

#[tokio::test]
async fn find_stale_filters_by_cutoff_subject_and_revocation() {
    let store = MemoryTokenStore::new();

    let mut old_live = store.create(1, None, None).await.expect("create");
    old_live.updated_at = Utc::now() - Duration::days(10);
    store.save(&old_live).await.expect("backdate");

    let mut old_revoked = store.create(2, None, None).await.expect("create");
    old_revoked.updated_at = Utc::now() - Duration::days(10);
    store.save(&old_revoked).await.expect("backdate");
    store.revoke(&old_revoked).await.expect("revoke");

    let fresh = store.create(1, None, None).await.expect("create");

    let cutoff = Utc::now() - Duration::days(5);

    let live_only = store
        .find_stale(cutoff, &[], false)
        .await
        .expect("find stale");
    assert_eq!(live_only.len(), 1);
    assert_eq!(live_only[0].id, old_live.id);

    let with_revoked = store
        .find_stale(cutoff, &[], true)
        .await
        .expect("find stale");
    let mut ids: Vec<i64> = with_revoked.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![old_live.id, old_revoked.id]);

    let filtered = store
        .find_stale(cutoff, &[2], true)
        .await
        .expect("find stale");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, old_revoked.id);

    assert!(!with_revoked.iter().any(|t| t.id == fresh.id));
}

#[tokio::test]
async fn recaller_lookup_round_trips_created_tokens() {
    let store = MemoryTokenStore::new();
    let token = store
        .create(7, Some("203.0.113.9"), Some("agent"))
        .await
        .expect("create");

    let found = find_by_recaller(&store, &token.recaller())
        .await
        .expect("lookup")
        .expect("found");
    assert_eq!(found.id, token.id);
    assert_eq!(found.secret, token.secret);
    assert_eq!(found.subject_id, 7);
}
