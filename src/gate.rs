/// Administrator capability gate
///
/// The core never owns sessions or login; it consumes a proven
/// "is administrator" check injected by the embedding application, so
/// the lifecycle is testable without an auth stack.
use crate::error::InviteResult;
use async_trait::async_trait;

/// Capability check for administrative entry points
#[async_trait]
pub trait AdminCapability: Send + Sync {
    async fn is_admin(&self, actor: &str) -> InviteResult<bool>;
}

/// Static allow-list of administrator ids
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    admins: Vec<String>,
}

impl AdminAllowList {
    pub fn new(admins: Vec<String>) -> Self {
        Self { admins }
    }
}

#[async_trait]
impl AdminCapability for AdminAllowList {
    async fn is_admin(&self, actor: &str) -> InviteResult<bool> {
        Ok(self.admins.iter().any(|a| a == actor))
    }
}
