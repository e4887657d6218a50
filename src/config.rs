/// Configuration for the invite code subsystem
use crate::error::{InviteError, InviteResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Invite subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteConfig {
    /// Whether registration requires presenting an invite code
    pub require_invite_code: bool,
    /// How many codes a non-admin user may mint for themselves
    pub max_codes_per_user: i64,
    /// Minimum account level for self-service issuance; enforcement of
    /// levels lives with the embedding user system, this is just the
    /// configured threshold it reads
    pub min_account_level: i64,
    /// Location of the invite code database
    pub db_location: PathBuf,
}

impl InviteConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> InviteResult<Self> {
        dotenv::dotenv().ok();

        let require_invite_code = env::var("GATEPASS_REQUIRE_INVITE_CODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| {
                InviteError::Validation("Invalid GATEPASS_REQUIRE_INVITE_CODE value".to_string())
            })?;
        let max_codes_per_user = env::var("GATEPASS_MAX_CODES_PER_USER")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| {
                InviteError::Validation("Invalid GATEPASS_MAX_CODES_PER_USER value".to_string())
            })?;
        let min_account_level = env::var("GATEPASS_MIN_ACCOUNT_LEVEL")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| {
                InviteError::Validation("Invalid GATEPASS_MIN_ACCOUNT_LEVEL value".to_string())
            })?;
        let db_location = env::var("GATEPASS_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/invites.sqlite"));

        let config = InviteConfig {
            require_invite_code,
            max_codes_per_user,
            min_account_level,
            db_location,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> InviteResult<()> {
        if self.max_codes_per_user < 0 {
            return Err(InviteError::Validation(
                "max_codes_per_user cannot be negative".to_string(),
            ));
        }
        if self.min_account_level < 0 {
            return Err(InviteError::Validation(
                "min_account_level cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            require_invite_code: false,
            max_codes_per_user: 10,
            min_account_level: 3,
            db_location: PathBuf::from("./data/invites.sqlite"),
        }
    }
}
