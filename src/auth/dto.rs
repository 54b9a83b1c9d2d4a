use serde::{Deserialize, Serialize};

/// Body for `POST /register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Free-form role, attached as a signed custom claim when present.
    #[serde(default)]
    pub role: Option<String>,
}

/// Body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    /// Accepted but never checked; see the login handler.
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Response for successful register and login calls.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: PublicUser,
}
