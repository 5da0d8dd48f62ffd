use crate::models::AuthUser;
use crate::services::supabase::{SupabaseClient, SupabaseError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Audience the hosted auth service stamps on user sessions
const SESSION_AUDIENCE: &str = "authenticated";

/// Errors that can occur while resolving a session
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed bearer token")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Session lookup failed: {0}")]
    LookupFailed(#[from] SupabaseError),
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Resolves bearer tokens to users
///
/// With a JWT secret configured, tokens are checked locally (HS256, session
/// audience, expiry). Otherwise every token is looked up through the auth API.
pub struct SessionVerifier {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
    supabase: Arc<SupabaseClient>,
}

impl SessionVerifier {
    pub fn new(jwt_secret: Option<&str>, supabase: Arc<SupabaseClient>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);

        Self {
            decoding_key: jwt_secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
            supabase,
        }
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value
    pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
        header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)
    }

    pub async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        match &self.decoding_key {
            Some(key) => self.verify_local(token, key),
            None => self.supabase.get_user(token).await.map_err(|e| match e {
                SupabaseError::Unauthorized => {
                    AuthError::InvalidToken("rejected by auth service".to_string())
                }
                other => AuthError::LookupFailed(other),
            }),
        }
    }

    fn verify_local(&self, token: &str, key: &DecodingKey) -> Result<AuthUser, AuthError> {
        let data = decode::<SessionClaims>(token, key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(AuthUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::supabase::SupabaseTables;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use std::time::Duration;

    const SECRET: &str = "test-jwt-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        email: &'a str,
        aud: &'a str,
        exp: u64,
    }

    fn verifier(secret: Option<&str>, url: String) -> SessionVerifier {
        let supabase = SupabaseClient::new(url, "anon".to_string(), SupabaseTables::default(), Duration::from_secs(5))
            .unwrap();
        SessionVerifier::new(secret, Arc::new(supabase))
    }

    fn token(aud: &str, exp_offset: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as u64;
        let claims = TestClaims { sub: "user-1", email: "ada@example.com", aud, exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(SessionVerifier::bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(SessionVerifier::bearer_token(Some("Basic abc")).is_err());
        assert!(SessionVerifier::bearer_token(Some("Bearer ")).is_err());
        assert!(SessionVerifier::bearer_token(None).is_err());
    }

    #[test]
    fn test_local_verification() {
        let verifier = verifier(Some(SECRET), "http://localhost".to_string());

        let user = tokio_test::block_on(verifier.verify(&token(SESSION_AUDIENCE, 3600, SECRET))).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));

        let expired = tokio_test::block_on(verifier.verify(&token(SESSION_AUDIENCE, -3600, SECRET)));
        assert!(matches!(expired, Err(AuthError::InvalidToken(_))));

        let wrong_audience = tokio_test::block_on(verifier.verify(&token("anon", 3600, SECRET)));
        assert!(matches!(wrong_audience, Err(AuthError::InvalidToken(_))));

        let wrong_secret = tokio_test::block_on(verifier.verify(&token(SESSION_AUDIENCE, 3600, "other")));
        assert!(matches!(wrong_secret, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_remote_lookup() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer good")
            .with_status(200)
            .with_body(r#"{"id": "user-2", "email": "bo@example.com", "aud": "authenticated"}"#)
            .create_async()
            .await;
        let rejected = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer bad")
            .with_status(401)
            .with_body(r#"{"msg": "invalid JWT"}"#)
            .create_async()
            .await;

        let verifier = verifier(None, server.url());

        let user = verifier.verify("good").await.unwrap();
        assert_eq!(user.id, "user-2");

        let err = verifier.verify("bad").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));

        ok.assert_async().await;
        rejected.assert_async().await;
    }
}
