//! The signed-in user handed over by the identity provider.

use super::ids::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name for the header greeting: display name, else the local part of the email
    pub fn greeting_name(&self) -> Option<&str> {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name);
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_prefers_display_name() {
        let user = User::new("u1")
            .with_email("ada@example.com")
            .with_display_name("Ada");
        assert_eq!(user.greeting_name(), Some("Ada"));
    }

    #[test]
    fn test_greeting_falls_back_to_email_local_part() {
        let user = User::new("u1").with_email("grace@example.com");
        assert_eq!(user.greeting_name(), Some("grace"));
        assert_eq!(User::new("u2").greeting_name(), None);
    }
}
