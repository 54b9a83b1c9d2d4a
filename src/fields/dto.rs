use serde::{Deserialize, Serialize};

/// Body for `POST /addField`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFieldRequest {
    pub field_name: String,
    pub location: String,
    pub price: f64,
    pub owner_id: String,
}

/// Acknowledgement for a stored field listing.
#[derive(Debug, Serialize)]
pub struct FieldCreated {
    pub message: &'static str,
}
