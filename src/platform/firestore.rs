use std::collections::BTreeMap;
use std::sync::Arc;

use axum::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Value};

use super::{
    error::{decode_response, PlatformError},
    token::TokenSource,
};

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// Length of store-assigned document ids, matching the platform SDKs.
const AUTO_ID_LEN: usize = 20;

/// A typed field value, covering what this service writes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Double(f64),
    Integer(i64),
    /// Resolved to the commit time by the store.
    ServerTimestamp,
}

impl FieldValue {
    /// The store's typed-value JSON encoding. `ServerTimestamp` has no
    /// value form; it travels as a field transform instead.
    fn to_wire(&self) -> Option<Value> {
        match self {
            FieldValue::String(s) => Some(json!({ "stringValue": s })),
            FieldValue::Double(n) => Some(json!({ "doubleValue": n })),
            FieldValue::Integer(n) => Some(json!({ "integerValue": n.to_string() })),
            FieldValue::ServerTimestamp => None,
        }
    }
}

/// Field name → value map for a single document write.
pub type Document = BTreeMap<String, FieldValue>;

/// Operations the service delegates to the managed document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or replace `collection/id` with the given fields.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> Result<(), PlatformError>;

    /// Create a document under a store-assigned id and return that id.
    async fn add_document(&self, collection: &str, doc: Document)
        -> Result<String, PlatformError>;
}

/// Document-store client over the platform's REST surface. Both write
/// shapes go through a single-write `commit` so server-timestamp fields
/// can ride along as transforms.
pub struct Firestore {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    project_id: String,
}

impl Firestore {
    pub fn new(project_id: &str, http: reqwest::Client, tokens: Arc<TokenSource>) -> Self {
        Self {
            http,
            tokens,
            project_id: project_id.to_string(),
        }
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{collection}/{id}",
            self.project_id
        )
    }

    fn commit_url(&self) -> String {
        format!(
            "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents:commit",
            self.project_id
        )
    }

    async fn commit(&self, name: String, doc: &Document) -> Result<(), PlatformError> {
        let bearer = self.tokens.bearer().await?;
        let response = self
            .http
            .post(self.commit_url())
            .bearer_auth(bearer)
            .json(&commit_body(&name, doc))
            .send()
            .await?;
        let _: Value = decode_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> Result<(), PlatformError> {
        self.commit(self.document_name(collection, id), &doc).await
    }

    async fn add_document(
        &self,
        collection: &str,
        doc: Document,
    ) -> Result<String, PlatformError> {
        // Ids are minted client-library-side, exactly as the SDKs do.
        let id = auto_id();
        self.commit(self.document_name(collection, &id), &doc).await?;
        Ok(id)
    }
}

fn auto_id() -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

fn commit_body(name: &str, doc: &Document) -> Value {
    let mut fields = serde_json::Map::new();
    let mut transforms = Vec::new();
    for (field, value) in doc {
        match value.to_wire() {
            Some(encoded) => {
                fields.insert(field.clone(), encoded);
            }
            None => transforms.push(json!({
                "fieldPath": field,
                "setToServerValue": "REQUEST_TIME",
            })),
        }
    }
    let mut write = json!({ "update": { "name": name, "fields": fields } });
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }
    json!({ "writes": [write] })
}
