//! services/api/src/adapters/identity_toolkit.rs
//!
//! This module contains the adapter for the Identity Toolkit REST API.
//! It implements the `IdentityProvider` port from the `core` crate.

use async_trait::async_trait;
use school_portal_core::ports::{IdentityProvider, PortError, PortResult, SignInError};
use school_portal_core::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::firebase::FirebaseClient;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordRequest<'a> {
    id_token: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Maps a provider error message such as `TOO_MANY_ATTEMPTS_TRY_LATER : ...`
/// to a sign-in failure. Only the code before ` : ` is significant.
pub fn map_sign_in_error(message: &str) -> SignInError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => SignInError::WrongPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => SignInError::TooManyRequests,
        "EMAIL_NOT_FOUND" => SignInError::UserNotFound,
        "INVALID_EMAIL" => SignInError::InvalidEmail,
        other => SignInError::Other(other.to_string()),
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("HTTP {}", status),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `IdentityProvider` port over Identity Toolkit.
#[derive(Clone)]
pub struct IdentityToolkitAdapter {
    client: FirebaseClient,
}

impl IdentityToolkitAdapter {
    /// Creates a new `IdentityToolkitAdapter`.
    pub fn new(client: FirebaseClient) -> Self {
        Self { client }
    }

    fn api_key(&self) -> &str {
        self.client.api_key().unwrap_or_default()
    }
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for IdentityToolkitAdapter {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser, SignInError> {
        let response = self
            .client
            .http()
            .post(self.client.auth_endpoint("signInWithPassword"))
            .query(&[("key", self.api_key())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Sign-in request failed: {}", e);
                SignInError::Other(format!("NETWORK_REQUEST_FAILED: {}", e))
            })?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            debug!("Sign-in rejected for {}: {}", email, message);
            return Err(map_sign_in_error(&message));
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| SignInError::Other(format!("MALFORMED_RESPONSE: {}", e)))?;
        Ok(AuthenticatedUser {
            uid: body.local_id,
            email: body.email.unwrap_or_else(|| email.to_string()),
            id_token: body.id_token,
        })
    }

    async fn update_password(&self, user: &AuthenticatedUser, new_password: &str) -> PortResult<()> {
        let response = self
            .client
            .http()
            .post(self.client.auth_endpoint("update"))
            .query(&[("key", self.api_key())])
            .json(&UpdatePasswordRequest {
                id_token: &user.id_token,
                password: new_password,
                return_secure_token: false,
            })
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            return Err(PortError::Unexpected(format!(
                "Password update failed for {}: {}",
                user.uid, message
            )));
        }
        Ok(())
    }
}
