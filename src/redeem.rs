/// Invite code redemption
use crate::error::{InviteError, InviteResult};
use crate::model::CodeStatus;
use crate::store::InviteStore;
use chrono::{DateTime, Utc};

/// Invite code redeemer
#[derive(Clone)]
pub struct Redeemer {
    store: InviteStore,
}

impl Redeemer {
    pub fn new(store: InviteStore) -> Self {
        Self { store }
    }

    /// Consume one use of a code.
    ///
    /// The status check here exists to hand back a precise rejection
    /// reason; the actual accounting is the store's conditional
    /// increment, which re-checks the cap at write time. A concurrent
    /// redemption can exhaust the cap between the read and the write,
    /// in which case the write affects no rows and this returns
    /// `Exhausted` — never a second success, and never a retry.
    pub async fn redeem(&self, code: &str, now: DateTime<Utc>) -> InviteResult<()> {
        let record = self
            .store
            .get_by_code(code)
            .await?
            .ok_or(InviteError::NotFound)?;

        match record.status(now) {
            CodeStatus::Exhausted => return Err(InviteError::Exhausted),
            CodeStatus::Expired => return Err(InviteError::Expired),
            CodeStatus::Active => {}
        }

        if self.store.increment_uses_if_under_cap(record.id).await? {
            Ok(())
        } else {
            // Lost the race for the last use
            Err(InviteError::Exhausted)
        }
    }
}
