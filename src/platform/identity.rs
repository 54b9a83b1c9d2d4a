use std::sync::Arc;

use axum::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    error::{decode_response, PlatformError},
    token::TokenSource,
};

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// A user record as held by the identity provider.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Claims carried by a platform-verified ID token.
#[derive(Debug, Clone, Default)]
pub struct VerifiedToken {
    pub uid: String,
    pub claims: Map<String, Value>,
}

impl VerifiedToken {
    /// The signed `role` custom claim, when one was attached.
    pub fn role(&self) -> Option<&str> {
        self.claims.get("role").and_then(Value::as_str)
    }

    /// Predicate the route gates compose over.
    pub fn has_role(&self, role: &str) -> bool {
        self.role() == Some(role)
    }
}

/// Operations the service delegates to the managed identity platform.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity record. The provider validates the email format
    /// and password strength, and assigns the uid.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserRecord, PlatformError>;

    /// Fetch the record registered under `email`, if any.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, PlatformError>;

    /// Have the platform verify an ID token and return its claims.
    async fn verify_id_token(&self, token: &str) -> Result<VerifiedToken, PlatformError>;

    /// Attach signed custom claims to an existing identity. Replaces any
    /// claims set previously.
    async fn set_custom_claims(&self, uid: &str, claims: &Value) -> Result<(), PlatformError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserEntry {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    /// Custom claims, serialized by the platform as a JSON object string.
    custom_attributes: Option<String>,
}

impl UserEntry {
    fn into_record(self) -> UserRecord {
        UserRecord {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
        }
    }

    fn into_verified(self) -> VerifiedToken {
        let claims = self
            .custom_attributes
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Map<String, Value>>(raw).ok())
            .unwrap_or_default();
        VerifiedToken {
            uid: self.local_id,
            claims,
        }
    }
}

/// Identity client over the platform's admin REST surface.
pub struct GoogleIdentity {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    project_id: String,
}

impl GoogleIdentity {
    pub fn new(project_id: &str, http: reqwest::Client, tokens: Arc<TokenSource>) -> Self {
        Self {
            http,
            tokens,
            project_id: project_id.to_string(),
        }
    }

    fn endpoint(&self, op: &str) -> String {
        format!("{IDENTITY_BASE}/projects/{}/{op}", self.project_id)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        op: &str,
        body: Value,
    ) -> Result<T, PlatformError> {
        let bearer = self.tokens.bearer().await?;
        let response = self
            .http
            .post(self.endpoint(op))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;
        decode_response(response).await
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserRecord, PlatformError> {
        let created: SignUpResponse = self
            .call(
                "accounts",
                json!({
                    "email": email,
                    "password": password,
                    "displayName": display_name,
                }),
            )
            .await?;
        Ok(UserRecord {
            uid: created.local_id,
            email: Some(email.to_string()),
            display_name: Some(display_name.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, PlatformError> {
        let lookup: LookupResponse = self
            .call("accounts:lookup", json!({ "email": [email] }))
            .await?;
        Ok(lookup.users.into_iter().next().map(UserEntry::into_record))
    }

    async fn verify_id_token(&self, token: &str) -> Result<VerifiedToken, PlatformError> {
        let lookup: LookupResponse = self
            .call("accounts:lookup", json!({ "idToken": token }))
            .await?;
        lookup
            .users
            .into_iter()
            .next()
            .map(UserEntry::into_verified)
            .ok_or(PlatformError::Api {
                status: 400,
                message: "no user record for the presented token".into(),
            })
    }

    async fn set_custom_claims(&self, uid: &str, claims: &Value) -> Result<(), PlatformError> {
        // The platform takes the claims object as an embedded JSON string.
        let _: Value = self
            .call(
                "accounts:update",
                json!({
                    "localId": uid,
                    "customAttributes": claims.to_string(),
                }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_entry_decodes_custom_attributes() {
        let raw = r#"{
            "kind": "identitytoolkit#GetAccountInfoResponse",
            "users": [{
                "localId": "AbC123",
                "email": "a@x.com",
                "displayName": "A",
                "customAttributes": "{\"role\":\"owner\"}"
            }]
        }"#;
        let lookup: LookupResponse = serde_json::from_str(raw).unwrap();
        let verified = lookup.users.into_iter().next().unwrap().into_verified();
        assert_eq!(verified.uid, "AbC123");
        assert_eq!(verified.role(), Some("owner"));
        assert!(verified.has_role("owner"));
        assert!(!verified.has_role("guest"));
    }

    #[test]
    fn lookup_entry_without_claims_has_no_role() {
        let raw = r#"{"users":[{"localId":"x1","email":"a@x.com"}]}"#;
        let lookup: LookupResponse = serde_json::from_str(raw).unwrap();
        let verified = lookup.users.into_iter().next().unwrap().into_verified();
        assert_eq!(verified.role(), None);
        assert!(!verified.has_role("owner"));
    }

    #[test]
    fn empty_lookup_decodes_to_no_users() {
        let lookup: LookupResponse =
            serde_json::from_str(r#"{"kind":"identitytoolkit#GetAccountInfoResponse"}"#).unwrap();
        assert!(lookup.users.is_empty());
    }

    #[test]
    fn entry_maps_to_record() {
        let entry: UserEntry = serde_json::from_str(
            r#"{"localId":"u9","email":"b@x.com","displayName":"B"}"#,
        )
        .unwrap();
        let record = entry.into_record();
        assert_eq!(record.uid, "u9");
        assert_eq!(record.email.as_deref(), Some("b@x.com"));
        assert_eq!(record.display_name.as_deref(), Some("B"));
    }
}
