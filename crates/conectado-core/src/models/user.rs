//! Session-related models: the signed-in user and login payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The signed-in user, as issued by the login operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// Build a user whose display name is the local part of the email
    /// (everything before the first `@`, or the whole string if there is none).
    pub fn from_email(id: impl Into<String>, email: &str) -> Self {
        Self {
            id: id.into(),
            name: email_local_part(email).to_string(),
            email: email.to_string(),
        }
    }
}

/// Return the part of an email address before the first `@`.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Login form input. Sent as the body of `POST /auth/login`.
#[derive(Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields must be filled; their content is not validated further.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login response: `{ token, user }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SessionInfo {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("teacher@school.br"), "teacher");
        assert_eq!(email_local_part("a.b+c@x.y"), "a.b+c");
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
        assert_eq!(email_local_part("@school.br"), "");
        assert_eq!(email_local_part("two@at@signs"), "two");
    }

    #[test]
    fn test_user_from_email() {
        let user = User::from_email("1", "teacher@school.br");
        assert_eq!(user.id, "1");
        assert_eq!(user.name, "teacher");
        assert_eq!(user.email, "teacher@school.br");
    }

    #[test]
    fn test_credentials_is_complete() {
        assert!(Credentials::new("a@b.c", "x").is_complete());
        assert!(!Credentials::new("", "x").is_complete());
        assert!(!Credentials::new("   ", "x").is_complete());
        assert!(!Credentials::new("a@b.c", "").is_complete());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("a@b.c", "hunter2"));
        assert!(debug.contains("a@b.c"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_session_info_parses_login_response() {
        let json = r#"{"token":"jwt","user":{"id":"42","name":"Ana","email":"ana@escola.br"}}"#;
        let info: SessionInfo = serde_json::from_str(json).expect("Failed to parse login response");
        assert_eq!(info.token, "jwt");
        assert_eq!(info.user.name, "Ana");
    }
}
