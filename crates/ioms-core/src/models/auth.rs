use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct SignInCredentials {
    pub email: String,
    pub password: String,
}

impl SignInCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl SignUpData {
    /// Name of the first required field left blank, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("email", &self.email),
            ("password", &self.password),
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("phone number", &self.phone_number),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Account record returned by the user endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Token endpoint response. Only `access` is relied upon.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<AccountUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{"refresh": "r.r.r", "access": "a.a.a"}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access, "a.a.a");
        assert!(resp.user.is_none());
    }

    #[test]
    fn test_parse_token_response_with_user() {
        let json = r#"{"access": "a.a.a", "user": {"id": 4, "email": "a@b.com"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        let user = resp.user.unwrap();
        assert_eq!(user.id, Some(4));
        assert_eq!(user.email, "a@b.com");
    }

    #[test]
    fn test_sign_up_missing_field() {
        let mut data = SignUpData {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: " ".to_string(),
        };
        assert_eq!(data.missing_field(), Some("phone number"));
        data.phone_number = "555-0100".to_string();
        assert_eq!(data.missing_field(), None);
    }
}
