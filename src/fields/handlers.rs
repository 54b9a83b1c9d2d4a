use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{error, info, instrument};

use crate::{
    auth::extractors::{Owner, RequireRole},
    error::ApiError,
    fields::dto::{AddFieldRequest, FieldCreated},
    platform::{Document, FieldValue},
    state::AppState,
};

/// Collection holding one document per field listing.
pub const FIELDS_COLLECTION: &str = "fields";

pub fn field_routes() -> Router<AppState> {
    Router::new().route("/addField", post(add_field))
}

/// Stores a venue listing under a store-assigned id. Restricted to callers
/// whose ID token carries the `owner` role claim; `ownerId` itself comes
/// from the payload and is not cross-checked against the token subject.
#[instrument(skip(state, token, payload))]
pub async fn add_field(
    State(state): State<AppState>,
    RequireRole(token, _): RequireRole<Owner>,
    Json(payload): Json<AddFieldRequest>,
) -> Result<(StatusCode, Json<FieldCreated>), ApiError> {
    let mut field = Document::new();
    field.insert("fieldName".into(), FieldValue::String(payload.field_name));
    field.insert("location".into(), FieldValue::String(payload.location));
    field.insert("price".into(), FieldValue::Double(payload.price));
    field.insert("ownerId".into(), FieldValue::String(payload.owner_id));
    field.insert("createdAt".into(), FieldValue::ServerTimestamp);

    let id = state
        .documents
        .add_document(FIELDS_COLLECTION, field)
        .await
        .map_err(|e| {
            error!(error = %e, uid = %token.uid, "field write failed");
            ApiError::FieldWrite(e)
        })?;

    info!(%id, uid = %token.uid, "field added");
    Ok((
        StatusCode::CREATED,
        Json(FieldCreated {
            message: "Field added successfully",
        }),
    ))
}
