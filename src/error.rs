/// Unified error types for the invite-code lifecycle
use thiserror::Error;

/// Main error type for invite-code operations
#[derive(Error, Debug)]
pub enum InviteError {
    /// Database errors (transport or transaction failure)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// No record matches the presented code string or id
    #[error("Invite code not found")]
    NotFound,

    /// Unique-constraint violation on creation
    #[error("Invite code already exists")]
    DuplicateCode,

    /// Generator could not find a free code within the retry budget
    #[error("Could not generate a unique invite code")]
    GenerationExhausted,

    /// Redemption rejected: all uses consumed
    #[error("Invite code has no uses remaining")]
    Exhausted,

    /// Redemption rejected: past its expiration
    #[error("Invite code has expired")]
    Expired,

    /// Malformed bulk-expiration input
    #[error("Invalid expiration policy: {0}")]
    InvalidPolicy(String),

    /// Validation errors on caller-supplied fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller lacks the administrator capability
    #[error("Not authorized")]
    NotAuthorized,

    /// Per-user issuance quota reached
    #[error("Invite quota reached ({0} codes)")]
    QuotaExceeded(i64),
}

impl InviteError {
    /// Whether this is a redemption rejection rather than an
    /// infrastructure failure. The registration boundary collapses all
    /// rejections into one generic invalid-code message so that probing
    /// cannot reveal which codes exist.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            InviteError::NotFound | InviteError::Exhausted | InviteError::Expired
        )
    }
}

/// Result type alias for invite-code operations
pub type InviteResult<T> = Result<T, InviteError>;
