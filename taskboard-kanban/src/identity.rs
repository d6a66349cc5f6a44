//! Identity provider capability and password-reset messaging.
//!
//! Sign-in itself happens in an external widget which hands the signed-in
//! [`User`] to the app shell; the core only observes auth state, signs out,
//! and requests reset emails.

use crate::store::Subscription;
use crate::types::User;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Failures reported by the identity provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no user record for this email")]
    UserNotFound,

    #[error("malformed email address")]
    InvalidEmail,

    #[error("too many requests")]
    TooManyRequests,

    /// Any other provider error, with its provider-specific code
    #[error("identity provider error: {0}")]
    Other(String),
}

impl IdentityError {
    /// Message shown to the user for a failed reset request
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserNotFound => "No account found with this email address.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::TooManyRequests => "Too many requests. Please try again later.",
            Self::Other(_) => "An error occurred. Please try again.",
        }
    }
}

/// Authentication capability
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current auth state followed by every change; release to unsubscribe
    fn auth_state(&self) -> Subscription<Option<User>>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError>;
}

/// Outcome of a password reset request, ready to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum ResetStatus {
    Success(String),
    Error(String),
}

impl ResetStatus {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Error(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Validate the email locally, then ask the provider to send a reset email
pub async fn request_password_reset<I>(identity: &I, email: &str) -> ResetStatus
where
    I: IdentityProvider + ?Sized,
{
    let email = email.trim();
    if email.is_empty() {
        return ResetStatus::Error("Please enter your email address.".to_string());
    }

    match identity.send_password_reset_email(email).await {
        Ok(()) => {
            info!("password reset email requested");
            ResetStatus::Success("Password reset email sent! Check your inbox.".to_string())
        }
        Err(error) => {
            warn!(%error, "password reset request failed");
            ResetStatus::Error(error.user_message().to_string())
        }
    }
}
