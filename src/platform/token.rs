use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use super::{credentials::ServiceAccount, error::PlatformError};

/// Scope covering both the identity API and the document store.
const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Lifetime requested for each grant assertion.
const GRANT_TTL_SECS: i64 = 3600;

/// Refresh the cached token once it has less than this long to live.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct GrantClaims {
    iss: String,
    scope: &'static str,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    access_token: String,
    /// Unix seconds.
    expires_at: i64,
}

/// Mints platform access tokens via the OAuth2 JWT-bearer grant and caches
/// the current one. The cache is client-library-internal state; request
/// handlers never observe it.
pub struct TokenSource {
    account: ServiceAccount,
    signing_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(account: ServiceAccount, http: reqwest::Client) -> Result<Self, PlatformError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| PlatformError::Token(format!("unusable private key: {e}")))?;
        Ok(Self {
            account,
            signing_key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Current access token, exchanged anew when the cached one is within
    /// the refresh margin of expiry.
    pub async fn bearer(&self) -> Result<String, PlatformError> {
        let mut cached = self.cached.lock().await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - now > REFRESH_MARGIN_SECS {
                return Ok(token.access_token.clone());
            }
        }
        let fresh = self.exchange(now).await?;
        let access = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access)
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken, PlatformError> {
        let assertion = encode(
            &Header::new(Algorithm::RS256),
            &grant_claims(&self.account, now),
            &self.signing_key,
        )
        .map_err(|e| PlatformError::Token(format!("sign grant assertion: {e}")))?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Token(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "platform access token refreshed");
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

fn grant_claims(account: &ServiceAccount, now: i64) -> GrantClaims {
    GrantClaims {
        iss: account.client_email.clone(),
        scope: SCOPE,
        aud: account.token_uri.clone(),
        iat: now,
        exp: now + GRANT_TTL_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> ServiceAccount {
        ServiceAccount {
            project_id: "sport-spot-test".into(),
            client_email: "svc@sport-spot-test.iam.gserviceaccount.com".into(),
            private_key: "not a pem key".into(),
            token_uri: "https://oauth2.googleapis.com/token".into(),
        }
    }

    #[test]
    fn grant_claims_window_and_audience() {
        let claims = grant_claims(&account(), 1_700_000_000);
        assert_eq!(claims.iss, "svc@sport-spot-test.iam.gserviceaccount.com");
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, GRANT_TTL_SECS);
        assert_eq!(claims.scope, SCOPE);
    }

    #[test]
    fn rejects_non_pem_private_key() {
        // `err()` rather than `unwrap_err`: the Ok side has no Debug impl.
        let err = TokenSource::new(account(), reqwest::Client::new()).err().unwrap();
        assert!(err.to_string().contains("unusable private key"));
    }
}
