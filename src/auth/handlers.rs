use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    error::ApiError,
    platform::{Document, FieldValue},
    state::AppState,
};

/// Collection holding one profile document per registered uid.
pub const USERS_COLLECTION: &str = "users";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Creates the identity record, attaches the role claim when one was
/// supplied, and writes the `users/{uid}` profile document. Email format
/// and password strength are the provider's checks, not ours; any provider
/// rejection surfaces as a 400 with the provider's message. Failure is
/// terminal for the request: partial effects are not rolled back.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = state
        .identity
        .create_user(&payload.email, &payload.password, &payload.display_name)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %payload.email, "create user failed");
            ApiError::Registration(e)
        })?;

    if let Some(role) = &payload.role {
        state
            .identity
            .set_custom_claims(&user.uid, &json!({ "role": role }))
            .await
            .map_err(|e| {
                error!(error = %e, uid = %user.uid, "set role claim failed");
                ApiError::Registration(e)
            })?;
    }

    let mut profile = Document::new();
    profile.insert("email".into(), FieldValue::String(payload.email.clone()));
    profile.insert(
        "displayName".into(),
        FieldValue::String(payload.display_name.clone()),
    );
    profile.insert("createdAt".into(), FieldValue::ServerTimestamp);
    state
        .documents
        .set_document(USERS_COLLECTION, &user.uid, profile)
        .await
        .map_err(|e| {
            error!(error = %e, uid = %user.uid, "write profile document failed");
            ApiError::Registration(e)
        })?;

    info!(uid = %user.uid, email = %payload.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            user: PublicUser {
                uid: user.uid,
                email: user.email,
                display_name: user.display_name,
                role: payload.role,
            },
        }),
    ))
}

/// Confirms the email maps to an existing identity. The password is
/// deserialized and ignored: the admin surface offers no password check,
/// and sign-in with credentials belongs to the platform's client-side
/// flow. Any caller supplying a registered email gets a 200.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .identity
        .get_user_by_email(&payload.email)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %payload.email, "user lookup failed");
            ApiError::Login(e)
        })?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login for unknown email");
            ApiError::UnknownUser
        })?;

    info!(uid = %user.uid, email = %payload.email, "login successful");
    Ok(Json(AuthResponse {
        message: "Login successful",
        user: PublicUser {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            role: None,
        },
    }))
}
