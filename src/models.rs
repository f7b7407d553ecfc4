use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Normalized identity of a logged-in user
///
/// Built once by a provider adapter after a successful callback and then carried
/// inside the encrypted `session` cookie. Only `provider` and `email` are
/// guaranteed; the remaining fields are whatever the provider exposes and may be
/// empty strings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserData {
    pub provider: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub url: String,
}

impl UserData {
    /// Create a record with the two required fields set
    #[must_use]
    pub fn new(provider: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            name: String::new(),
            email: email.into(),
            avatar: String::new(),
            url: String::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// A record is only usable as a session identity when both the provider tag
    /// and the email address are present
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.provider.is_empty() && !self.email.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_data_json_shape() {
        let user = UserData::new("github", "ada@x.com")
            .with_name("Ada")
            .with_avatar("http://example.com/a.png")
            .with_url("http://github.com/ada");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["provider"], "github");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["email"], "ada@x.com");
        assert_eq!(json["avatar"], "http://example.com/a.png");
        assert_eq!(json["url"], "http://github.com/ada");
    }

    #[test]
    fn test_user_data_validity() {
        assert!(UserData::new("google", "a@b.c").is_valid());
        assert!(!UserData::new("", "a@b.c").is_valid());
        assert!(!UserData::new("google", "").is_valid());
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let user: UserData =
            serde_json::from_str(r#"{"provider":"google","email":"a@b.c"}"#).unwrap();
        assert_eq!(user.name, "");
        assert_eq!(user.avatar, "");
        assert_eq!(user.url, "");
    }
}
