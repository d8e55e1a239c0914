//! Signed-in user as reported by the identity provider.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User profile from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Provider-assigned user ID, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Email address (identifies habit ownership)
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Profile photo URL
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            uid: None,
            email: email.into(),
            display_name,
            photo_url: None,
        }
    }

    /// Name copied into habits and sent to the token endpoint.
    /// Falls back to the email when no display name is set.
    pub fn name_or_email(&self) -> &str {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}
