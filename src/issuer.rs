/// Invite code issuance
use crate::error::{InviteError, InviteResult};
use crate::generator;
use crate::model::InviteCode;
use crate::store::{InviteStore, NewInviteCode};
use chrono::{DateTime, Utc};

/// How many generated candidates to try before giving up. A collision
/// among 36^32 codes means the store already holds an absurd number of
/// records, so a small budget is plenty.
pub const GENERATION_ATTEMPTS: u32 = 5;

/// Issuance request
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Admin-supplied code text; `None` means generate one
    pub code: Option<String>,
    pub max_uses: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub issued_by: String,
}

/// Invite code issuer
#[derive(Clone)]
pub struct Issuer {
    store: InviteStore,
}

impl Issuer {
    pub fn new(store: InviteStore) -> Self {
        Self { store }
    }

    /// Create a new invite code.
    ///
    /// An explicit code is used verbatim and a collision surfaces as
    /// `DuplicateCode`. Without one, generation is retried on collision
    /// up to `GENERATION_ATTEMPTS` times. A past `expires_at` is allowed;
    /// admins deliberately create pre-expired codes for testing.
    pub async fn issue(&self, request: IssueRequest) -> InviteResult<InviteCode> {
        if request.max_uses < 1 {
            return Err(InviteError::Validation(
                "max_uses must be a positive integer".to_string(),
            ));
        }

        if let Some(code) = request.code {
            if code.trim().is_empty() {
                return Err(InviteError::Validation(
                    "code must not be empty".to_string(),
                ));
            }

            let record = self
                .store
                .create(NewInviteCode {
                    code,
                    issued_by: request.issued_by,
                    max_uses: request.max_uses,
                    expires_at: request.expires_at,
                })
                .await?;

            tracing::info!("Issued invite code {} (admin-supplied)", record.id);
            return Ok(record);
        }

        for attempt in 1..=GENERATION_ATTEMPTS {
            let code = generator::generate();
            match self
                .store
                .create(NewInviteCode {
                    code,
                    issued_by: request.issued_by.clone(),
                    max_uses: request.max_uses,
                    expires_at: request.expires_at,
                })
                .await
            {
                Ok(record) => {
                    tracing::info!("Issued invite code {}", record.id);
                    return Ok(record);
                }
                Err(InviteError::DuplicateCode) => {
                    tracing::warn!(
                        "Generated invite code collided, retrying (attempt {})",
                        attempt
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(InviteError::GenerationExhausted)
    }
}
