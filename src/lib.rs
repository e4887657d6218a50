//! Gatepass — invite-code credential lifecycle for admin backends.
//!
//! Issues single-purpose registration tokens, validates a presented code
//! at redemption time, accounts uses atomically against a cap, expires
//! codes by time, and rewrites expirations in administrative batches.
//! Rendering, pagination, sessions and HTTP routing belong to the
//! embedding application; it injects a [`gate::AdminCapability`] check
//! and consumes typed results.

pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod generator;
pub mod issuer;
pub mod model;
pub mod policy;
pub mod redeem;
pub mod service;
pub mod store;

pub use config::InviteConfig;
pub use error::{InviteError, InviteResult};
pub use gate::{AdminAllowList, AdminCapability};
pub use issuer::{IssueRequest, Issuer};
pub use model::{CodeStatus, InviteCode};
pub use policy::{BulkExpiration, ExpirationPolicy};
pub use redeem::Redeemer;
pub use service::InviteService;
pub use store::{InviteStore, ListFilter, NewInviteCode};
