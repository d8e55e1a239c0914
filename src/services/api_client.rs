// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated client for the habits backend.
//!
//! Handles:
//! - Bearer token injection, re-read from the session on every request
//! - Token purge and session-expired signal on HTTP 401
//! - Mapping transport and HTTP failures onto [`AppError`]
//!
//! No retry or caching layer.

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::storage::Session;

/// Route the presentation layer should send the user to after a 401.
pub const LOGIN_ROUTE: &str = "/login";

/// Callback fired once per 401 response, with [`LOGIN_ROUTE`].
pub type SessionExpiredHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Error body the backend sends with failed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Habits backend client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    on_session_expired: Option<SessionExpiredHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            on_session_expired: None,
        }
    }

    /// Register the reaction to a rejected session (e.g. sending the user
    /// to the sign-in screen).
    pub fn with_session_expired_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one authenticated request and decode the JSON response.
    pub async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(method, path, body, true).await?;
        decode_json(response).await
    }

    /// Send one request without credentials. A 401 here is an ordinary
    /// API error; the stored session is not touched.
    pub async fn public_request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(method, path, body, false).await?;
        decode_json(response).await
    }

    /// Authenticated request whose response body is ignored.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body, true).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, None).await
    }

    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        if authenticated {
            if let Some(token) = self.session.token()? {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, authenticated, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request failed to reach backend");
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && authenticated {
            self.expire_session(&method, path);
            return Err(AppError::SessionExpired);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        tracing::warn!(%method, path, status = status.as_u16(), "Backend returned an error");
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Purge the stored token and raise the session-expired signal.
    fn expire_session(&self, method: &Method, path: &str) {
        tracing::info!(%method, path, "Session rejected (401), clearing stored token");

        if let Err(e) = self.session.clear_token() {
            tracing::error!(error = %e, "Failed to clear stored token");
        }
        if let Some(hook) = &self.on_session_expired {
            hook(LOGIN_ROUTE);
        }
    }
}

/// Decode a JSON body; an empty body decodes as JSON `null`.
async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read response: {}", e)))?;

    let slice: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };

    serde_json::from_slice(slice).map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))
}

/// Percent-encode an opaque ID for use as a path segment.
pub fn encode_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
