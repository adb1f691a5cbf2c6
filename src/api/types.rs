//! REST payload types.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Loose `local@domain.tld` shape check.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// ============================================================================
// Login
// ============================================================================

/// Successful `/login` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token type, normally `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

// ============================================================================
// Users
// ============================================================================

/// A user record as returned by `/usuario`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned ID.
    pub id: i64,
    /// Display name.
    pub nome: String,
    /// E-mail address.
    pub email: String,
    /// Password, when the backend echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,
}

/// Payload of `POST /usuario`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    /// Display name.
    pub nome: String,
    /// E-mail address.
    pub email: String,
    /// Initial password.
    pub senha: String,
}

impl NewUser {
    /// Creates a payload.
    #[must_use]
    pub fn new(
        nome: impl Into<String>,
        email: impl Into<String>,
        senha: impl Into<String>,
    ) -> Self {
        Self {
            nome: nome.into(),
            email: email.into(),
            senha: senha.into(),
        }
    }

    /// Checks that every field is filled in and the e-mail is plausible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        require("nome", &self.nome)?;
        validate_email(&self.email)?;
        require("senha", &self.senha)
    }
}

/// Payload of `PUT /usuario/{id}`.
///
/// `senha` is omitted from the body when `None`, keeping the stored password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    /// Display name.
    pub nome: String,
    /// E-mail address.
    pub email: String,
    /// New password, if changing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,
}

impl UserUpdate {
    /// Creates a payload.
    ///
    /// An empty `senha` is treated as "keep current password".
    #[must_use]
    pub fn new(nome: impl Into<String>, email: impl Into<String>, senha: Option<String>) -> Self {
        Self {
            nome: nome.into(),
            email: email.into(),
            senha: senha.filter(|s| !s.is_empty()),
        }
    }

    /// Checks that name and e-mail are filled in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        require("nome", &self.nome)?;
        validate_email(&self.email)
    }
}

// ============================================================================
// Validation
// ============================================================================

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_message(format!("{field} is required")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    require("email", email)?;
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(Error::invalid_message(format!("invalid email: {email}")));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_token_type_optional() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"access_token":"abc"}"#).expect("parse");
        assert_eq!(response.access_token, "abc");
        assert!(response.token_type.is_none());
    }

    #[test]
    fn test_user_without_senha() {
        let user: User =
            serde_json::from_str(r#"{"id":3,"nome":"Ana","email":"ana@x.com"}"#).expect("parse");
        assert_eq!(user.id, 3);
        assert!(user.senha.is_none());
        assert_eq!(
            serde_json::to_string(&user).expect("serialize"),
            r#"{"id":3,"nome":"Ana","email":"ana@x.com"}"#
        );
    }

    #[test]
    fn test_new_user_validation() {
        assert!(NewUser::new("Ana", "ana@x.com", "segredo").validate().is_ok());
        assert!(NewUser::new("", "ana@x.com", "segredo").validate().is_err());
        assert!(NewUser::new("Ana", "ana", "segredo").validate().is_err());
        assert!(NewUser::new("Ana", "ana@x.com", "").validate().is_err());
    }

    #[test]
    fn test_update_omits_empty_password() {
        let update = UserUpdate::new("Ana", "ana@x.com", Some(String::new()));
        assert_eq!(
            serde_json::to_string(&update).expect("serialize"),
            r#"{"nome":"Ana","email":"ana@x.com"}"#
        );
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_keeps_new_password() {
        let update = UserUpdate::new("Ana", "ana@x.com", Some("nova".into()));
        assert_eq!(update.senha.as_deref(), Some("nova"));
    }
}
