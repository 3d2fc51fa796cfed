//! Account session operations: the only writers of the credential.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::credential::ClearReason;
use crate::error::{Error, Result};
use crate::transport::Transport;

pub const LOGIN_PATH: &str = "/users/login";
pub const REGISTER_PATH: &str = "/users/register";
pub const LOGOUT_PATH: &str = "/users/logout";

/// Payload returned by login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

/// Sign in and store the issued token.
pub async fn login(transport: &Transport, phone: &str, password: &str) -> Result<LoginResponse> {
    let response: LoginResponse = transport
        .post(LOGIN_PATH, Some(json!({ "phone": phone, "password": password })))
        .await?;
    store_token(transport, &response)?;
    tracing::info!("Signed in");
    Ok(response)
}

/// Create an account and store the issued token.
pub async fn register(
    transport: &Transport,
    phone: &str,
    password: &str,
    confirm_password: &str,
) -> Result<LoginResponse> {
    let response: LoginResponse = transport
        .post(
            REGISTER_PATH,
            Some(json!({
                "phone": phone,
                "password": password,
                "confirmPassword": confirm_password,
            })),
        )
        .await?;
    store_token(transport, &response)?;
    tracing::info!("Account registered");
    Ok(response)
}

/// Sign out. The local session always ends, even if the backend call fails.
pub async fn logout(transport: &Transport) {
    match transport.post::<serde_json::Value>(LOGOUT_PATH, None).await {
        // The transport already ended the session for an expired token.
        Err(Error::Unauthorized { .. }) => return,
        Err(e) => tracing::warn!(error = %e, "Logout request failed"),
        Ok(_) => {}
    }
    transport.end_session(ClearReason::Logout);
}

fn store_token(transport: &Transport, response: &LoginResponse) -> Result<()> {
    if response.token.is_empty() {
        return Err(Error::Other("backend issued an empty token".to_string()));
    }
    transport
        .credentials()
        .set(response.token.clone())
        .map_err(|e| Error::Other(format!("failed to persist credential: {}", e)))
}
