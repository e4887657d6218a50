/// Bulk expiration policies
use crate::error::{InviteError, InviteResult};
use crate::store::InviteStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What to do with the targeted codes' expiration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "at")]
pub enum ExpirationPolicy {
    /// Clear `expires_at`; the codes never expire
    Never,
    /// Expire the codes as of the operation's current time
    Immediately,
    /// Set `expires_at` to a specific instant, future or past
    At(DateTime<Utc>),
}

impl ExpirationPolicy {
    /// Parse the admin form's policy kind. An `at` kind without a
    /// timestamp is malformed input, not an implicit `never`.
    pub fn parse(kind: &str, at: Option<DateTime<Utc>>) -> InviteResult<Self> {
        match kind {
            "never" => Ok(ExpirationPolicy::Never),
            "now" => Ok(ExpirationPolicy::Immediately),
            "at" => at.map(ExpirationPolicy::At).ok_or_else(|| {
                InviteError::InvalidPolicy(
                    "expiration kind 'at' requires a timestamp".to_string(),
                )
            }),
            other => Err(InviteError::InvalidPolicy(format!(
                "unknown expiration kind: {}",
                other
            ))),
        }
    }

    /// The `expires_at` value this policy writes
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpirationPolicy::Never => None,
            ExpirationPolicy::Immediately => Some(now),
            ExpirationPolicy::At(t) => Some(*t),
        }
    }
}

/// Applies an expiration policy to an administrator-selected set of codes
#[derive(Clone)]
pub struct BulkExpiration {
    store: InviteStore,
}

impl BulkExpiration {
    pub fn new(store: InviteStore) -> Self {
        Self { store }
    }

    /// Rewrite `expires_at` for every id in the selection, in one
    /// transaction. `ids` must be stable store identifiers submitted by
    /// the UI at selection time; identity is never re-derived from a
    /// position in a previously fetched page.
    pub async fn apply(
        &self,
        ids: &[i64],
        policy: ExpirationPolicy,
        now: DateTime<Utc>,
    ) -> InviteResult<u64> {
        let updated = self
            .store
            .update_expiration(ids, policy.resolve(now))
            .await?;

        tracing::info!(
            "Applied expiration policy {:?} to {} of {} selected codes",
            policy,
            updated,
            ids.len()
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::CodeStatus;
    use crate::store::NewInviteCode;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn test_parse_known_kinds() {
        let ts = Utc::now();
        assert_eq!(
            ExpirationPolicy::parse("never", None).unwrap(),
            ExpirationPolicy::Never
        );
        assert_eq!(
            ExpirationPolicy::parse("now", None).unwrap(),
            ExpirationPolicy::Immediately
        );
        assert_eq!(
            ExpirationPolicy::parse("at", Some(ts)).unwrap(),
            ExpirationPolicy::At(ts)
        );
    }

    #[test]
    fn test_parse_at_without_timestamp_is_invalid() {
        let err = ExpirationPolicy::parse("at", None).unwrap_err();
        assert!(matches!(err, InviteError::InvalidPolicy(_)));
    }

    #[test]
    fn test_parse_unknown_kind_is_invalid() {
        let err = ExpirationPolicy::parse("eventually", None).unwrap_err();
        assert!(matches!(err, InviteError::InvalidPolicy(_)));
    }

    #[test]
    fn test_resolve() {
        let now = Utc::now();
        let ts = now + chrono::Duration::days(7);
        assert_eq!(ExpirationPolicy::Never.resolve(now), None);
        assert_eq!(ExpirationPolicy::Immediately.resolve(now), Some(now));
        assert_eq!(ExpirationPolicy::At(ts).resolve(now), Some(ts));
    }

    async fn memory_bulk() -> (BulkExpiration, InviteStore) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        db::init_schema(&pool).await.unwrap();
        let store = InviteStore::new(pool);
        (BulkExpiration::new(store.clone()), store)
    }

    fn new_code(code: &str) -> NewInviteCode {
        NewInviteCode {
            code: code.to_string(),
            issued_by: "admin".to_string(),
            max_uses: 1,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_immediate_expiry_hits_selection_and_nothing_else() {
        let (bulk, store) = memory_bulk().await;
        let a = store.create(new_code("aaa")).await.unwrap();
        let b = store.create(new_code("bbb")).await.unwrap();
        let c = store.create(new_code("ccc")).await.unwrap();

        let now = Utc::now();
        let updated = bulk
            .apply(&[a.id, b.id], ExpirationPolicy::Immediately, now)
            .await
            .unwrap();
        assert_eq!(updated, 2);

        for id in [a.id, b.id] {
            let rec = store.get_by_id(id).await.unwrap().unwrap();
            assert!(rec.expires_at.unwrap() <= Utc::now());
            assert_eq!(rec.status(Utc::now()), CodeStatus::Expired);
        }
        let untouched = store.get_by_id(c.id).await.unwrap().unwrap();
        assert!(untouched.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_never_policy_reopens_an_expired_code() {
        let (bulk, store) = memory_bulk().await;
        let now = Utc::now();
        let mut new = new_code("revivable");
        new.expires_at = Some(now - chrono::Duration::hours(1));
        let rec = store.create(new).await.unwrap();
        assert!(!rec.is_valid(now));

        bulk.apply(&[rec.id], ExpirationPolicy::Never, now)
            .await
            .unwrap();

        let fetched = store.get_by_id(rec.id).await.unwrap().unwrap();
        assert!(fetched.is_valid(now));
    }

    #[tokio::test]
    async fn test_empty_selection_is_a_no_op() {
        let (bulk, _) = memory_bulk().await;
        let updated = bulk
            .apply(&[], ExpirationPolicy::Immediately, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated, 0);
    }
}
