//! Identity supplied by the external authentication provider.

use serde::{Deserialize, Serialize};

/// Signed-in user as reported by the auth provider. Read-only to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Provider-assigned stable user id.
    pub uid: String,
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(uid: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name,
        }
    }

    /// Name to greet the user with, falling back to the uid.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.uid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::UserIdentity;

    #[test]
    fn greeting_name_falls_back_to_uid_for_blank_display_name() {
        let named = UserIdentity::new("u1", Some(" Ada ".to_string()));
        assert_eq!(named.greeting_name(), "Ada");
        let blank = UserIdentity::new("u2", Some("  ".to_string()));
        assert_eq!(blank.greeting_name(), "u2");
        assert_eq!(UserIdentity::new("u3", None).greeting_name(), "u3");
    }
}
