/// Invite code record and derived status
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invite code
///
/// `uses` starts at 0 and only successful redemption moves it; status is
/// always computed from `uses`/`max_uses`/`expires_at`, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    /// Store-assigned identifier, the sole handle for targeted updates
    pub id: i64,
    /// The externally presented bearer token, unique across all records
    pub code: String,
    /// Provenance: who created the code (not ownership)
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the code never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Redemption cap, immutable after creation
    pub max_uses: i64,
    pub uses: i64,
}

/// Why a code is (un)usable, for administrative display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    Active,
    Exhausted,
    Expired,
}

impl InviteCode {
    /// Derived status. Exhaustion is checked before expiry; both are
    /// terminal, so the tie-break only affects which reason is shown.
    pub fn status(&self, now: DateTime<Utc>) -> CodeStatus {
        if self.uses >= self.max_uses {
            CodeStatus::Exhausted
        } else if self.expires_at.is_some_and(|t| t <= now) {
            CodeStatus::Expired
        } else {
            CodeStatus::Active
        }
    }

    /// Whether the code is currently redeemable
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == CodeStatus::Active
    }
}
