//! REST client for the AKASYS backend.
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `POST` | `/login` | form `username`, `password` | [`LoginResponse`] |
//! | `POST` | `/usuario` | [`NewUser`] | [`User`] |
//! | `GET` | `/usuario/{id}` | | [`User`] |
//! | `PUT` | `/usuario/{id}` | [`UserUpdate`] | [`User`] |
//! | `DELETE` | `/usuario/{id}` | | `204` |
//! | `POST` | caller-chosen | multipart field `file` | JSON |
//!
//! Error bodies carry a `detail` field. It becomes the `detail` of
//! [`Error::Api`]; without one the raw body is used, and an empty body
//! yields `Erro: {status}`.

// ============================================================================
// Submodules
// ============================================================================

/// Request and response payloads.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::{LoginResponse, NewUser, User, UserUpdate};

// ============================================================================
// Imports
// ============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

use self::types::ErrorBody;

// ============================================================================
// Constants
// ============================================================================

/// Form field name for uploads.
const UPLOAD_FIELD: &str = "file";

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client bound to one backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    token: Option<String>,
}

impl ApiClient {
    /// Creates an anonymous client.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            token: None,
        }
    }

    /// Returns a copy that sends `Authorization: Bearer {token}`.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns `true` if a bearer token is attached.
    #[inline]
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

// ============================================================================
// ApiClient - Endpoints
// ============================================================================

impl ApiClient {
    /// Exchanges credentials for an access token.
    ///
    /// # Errors
    ///
    /// - [`Error::Api`] on a non-success status
    /// - [`Error::MissingToken`] if the body has no `access_token`
    /// - [`Error::Http`] if the request fails
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = format!("username={}&password={}", encode(username), encode(password));

        let response = self
            .request(self.http.post(self.config.api_url("/login")))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let value: Value = Self::parse(response).await?;
        if value.get("access_token").and_then(Value::as_str).is_none() {
            warn!("Login response without access_token");
            return Err(Error::MissingToken);
        }

        debug!(username, "Login succeeded");
        Ok(serde_json::from_value(value)?)
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMessage`] if the payload fails validation
    /// - [`Error::Api`] on a non-success status
    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        let response = self
            .request(self.http.post(self.config.api_url("/usuario")))
            .json(user)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Fetches one user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-success status.
    pub async fn read_user(&self, id: i64) -> Result<User> {
        let response = self
            .request(self.http.get(self.user_url(id)))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Replaces a user's name, e-mail and optionally password.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMessage`] if the payload fails validation
    /// - [`Error::Api`] on a non-success status
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User> {
        update.validate()?;
        let response = self
            .request(self.http.put(self.user_url(id)))
            .json(update)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-success status.
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let response = self
            .request(self.http.delete(self.user_url(id)))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let raw = response.text().await.unwrap_or_default();
        Err(Error::api(status.as_u16(), error_detail(status, &raw)))
    }

    /// Uploads a file as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-success status.
    pub async fn upload_file(
        &self,
        endpoint: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .request(self.http.post(self.config.api_url(endpoint)))
            .multipart(form)
            .send()
            .await?;
        Self::parse(response).await
    }
}

// ============================================================================
// ApiClient - Internals
// ============================================================================

impl ApiClient {
    fn user_url(&self, id: i64) -> String {
        self.config.api_url(&format!("/usuario/{id}"))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Reads the body and decodes it, mapping error statuses to [`Error::Api`].
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            let detail = error_detail(status, &raw);
            warn!(status = status.as_u16(), %detail, "API request failed");
            return Err(Error::api(status.as_u16(), detail));
        }

        let body = if raw.trim().is_empty() { "null" } else { raw.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}

/// Picks the most useful error text from a failed response.
fn error_detail(status: StatusCode, raw: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(raw)
        .ok()
        .and_then(|body| body.detail)
        .map(|detail| match detail {
            Value::String(text) => text,
            other => other.to_string(),
        });

    match detail {
        Some(detail) => detail,
        None if !raw.trim().is_empty() => raw.to_string(),
        None => format!("Erro: {}", status.as_u16()),
    }
}

// ============================================================================
// Tests
// ============================================================================
