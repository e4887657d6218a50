/// Gated facade over the invite code lifecycle
///
/// Administrative entry points check the injected capability; the
/// boundary translates `NotAuthorized` into its own not-found/forbidden
/// response. Redemption and validity lookups are open to the
/// registration flow.
use crate::config::InviteConfig;
use crate::error::{InviteError, InviteResult};
use crate::gate::AdminCapability;
use crate::issuer::{IssueRequest, Issuer};
use crate::model::InviteCode;
use crate::policy::{BulkExpiration, ExpirationPolicy};
use crate::redeem::Redeemer;
use crate::store::{InviteStore, ListFilter};
use chrono::Utc;
use std::sync::Arc;

/// Admin listing page size
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Invite code service
#[derive(Clone)]
pub struct InviteService {
    store: InviteStore,
    issuer: Issuer,
    redeemer: Redeemer,
    bulk: BulkExpiration,
    gate: Arc<dyn AdminCapability>,
    config: InviteConfig,
}

impl InviteService {
    pub fn new(
        db: sqlx::SqlitePool,
        gate: Arc<dyn AdminCapability>,
        config: InviteConfig,
    ) -> Self {
        let store = InviteStore::new(db);
        Self {
            issuer: Issuer::new(store.clone()),
            redeemer: Redeemer::new(store.clone()),
            bulk: BulkExpiration::new(store.clone()),
            store,
            gate,
            config,
        }
    }

    async fn require_admin(&self, actor: &str) -> InviteResult<()> {
        if self.gate.is_admin(actor).await? {
            Ok(())
        } else {
            Err(InviteError::NotAuthorized)
        }
    }

    /// Create an invite code on behalf of an administrator
    pub async fn issue(&self, actor: &str, request: IssueRequest) -> InviteResult<InviteCode> {
        self.require_admin(actor).await?;
        self.issuer.issue(request).await
    }

    /// Mint a single-use, never-expiring code for a regular user,
    /// subject to the per-user quota.
    pub async fn issue_self_service(&self, user: &str) -> InviteResult<InviteCode> {
        if !self.config.require_invite_code {
            return Err(InviteError::Validation(
                "invite codes are not enabled on this site".to_string(),
            ));
        }

        let created = self.store.count_issued_by(user).await?;
        if created >= self.config.max_codes_per_user {
            return Err(InviteError::QuotaExceeded(self.config.max_codes_per_user));
        }

        self.issuer
            .issue(IssueRequest {
                code: None,
                max_uses: 1,
                expires_at: None,
                issued_by: user.to_string(),
            })
            .await
    }

    /// List codes for the admin view
    pub async fn list(
        &self,
        actor: &str,
        filter: ListFilter,
        page: u32,
    ) -> InviteResult<Vec<InviteCode>> {
        self.require_admin(actor).await?;
        self.store.list(filter, page, DEFAULT_PAGE_SIZE).await
    }

    /// Apply an expiration policy to a selected set of code ids
    pub async fn apply_expiration(
        &self,
        actor: &str,
        ids: &[i64],
        policy: ExpirationPolicy,
    ) -> InviteResult<u64> {
        self.require_admin(actor).await?;
        self.bulk.apply(ids, policy, Utc::now()).await
    }

    /// Consume one use of a code during registration
    pub async fn redeem(&self, code: &str) -> InviteResult<()> {
        self.redeemer.redeem(code, Utc::now()).await
    }

    /// Resolve a code string to its record, without consuming a use.
    /// Validity is judged separately via `InviteCode::is_valid` /
    /// `status` so callers can report why a code is unusable.
    pub async fn get_valid(&self, code: &str) -> InviteResult<InviteCode> {
        self.store
            .get_by_code(code)
            .await?
            .ok_or(InviteError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::gate::AdminAllowList;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_service(config: InviteConfig) -> InviteService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        db::init_schema(&pool).await.unwrap();
        let gate = Arc::new(AdminAllowList::new(vec!["root".to_string()]));
        InviteService::new(pool, gate, config)
    }

    fn admin_request(code: &str) -> IssueRequest {
        IssueRequest {
            code: Some(code.to_string()),
            max_uses: 1,
            expires_at: None,
            issued_by: "root".to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_admin_cannot_issue_or_list_or_expire() {
        let service = memory_service(InviteConfig::default()).await;

        let err = service
            .issue("mallory", admin_request("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::NotAuthorized));

        let err = service.list("mallory", ListFilter::All, 1).await.unwrap_err();
        assert!(matches!(err, InviteError::NotAuthorized));

        let err = service
            .apply_expiration("mallory", &[1], ExpirationPolicy::Never)
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::NotAuthorized));
    }

    #[tokio::test]
    async fn test_admin_lifecycle_round_trip() {
        let service = memory_service(InviteConfig::default()).await;

        let mut request = admin_request("X");
        request.max_uses = 3;
        let record = service.issue("root", request).await.unwrap();
        assert_eq!(record.uses, 0);
        assert_eq!(record.max_uses, 3);

        service.redeem("X").await.unwrap();
        let fetched = service.get_valid("X").await.unwrap();
        assert_eq!(fetched.uses, 1);
        assert!(fetched.is_valid(Utc::now()));

        let listed = service.list("root", ListFilter::All, 1).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_redemption_needs_no_capability() {
        let service = memory_service(InviteConfig::default()).await;
        service.issue("root", admin_request("open")).await.unwrap();

        // The registration flow has no admin actor
        service.redeem("open").await.unwrap();
    }

    #[tokio::test]
    async fn test_self_service_quota() {
        let config = InviteConfig {
            require_invite_code: true,
            max_codes_per_user: 2,
            ..Default::default()
        };
        let service = memory_service(config).await;

        service.issue_self_service("alice").await.unwrap();
        service.issue_self_service("alice").await.unwrap();

        let err = service.issue_self_service("alice").await.unwrap_err();
        assert!(matches!(err, InviteError::QuotaExceeded(2)));

        // The quota is per user
        service.issue_self_service("bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_self_service_codes_are_single_use() {
        let config = InviteConfig {
            require_invite_code: true,
            ..Default::default()
        };
        let service = memory_service(config).await;

        let record = service.issue_self_service("alice").await.unwrap();
        assert_eq!(record.max_uses, 1);
        assert!(record.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_self_service_disabled_when_invites_not_required() {
        let service = memory_service(InviteConfig::default()).await;
        let err = service.issue_self_service("alice").await.unwrap_err();
        assert!(matches!(err, InviteError::Validation(_)));
    }
}
