/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts the bearer token from the Authorization
 * header, verifies it against both the token codec and the token store, and
 * hands the caller to handlers as a `Principal`.
 *
 * # Verification Steps
 *
 * 1. Signature, algorithm and `exp` (codec)
 * 2. `sub` and `user_id` claims present, `user_id` a UUID
 * 3. Token record exists in the store
 * 4. Record not past `expires_at`
 * 5. Record still active
 *
 * An expired token found at step 1 or 4 also deactivates its record.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::backend::auth::error::AuthError;
use crate::backend::auth::service::SessionManager;
use crate::backend::auth::sessions::{CodecError, Principal, TokenCodec};
use crate::backend::auth::tokens::{TokenKind, TokenStore};
use crate::backend::error::conversion::bearer_challenge;
use crate::backend::error::BackendError;

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::InvalidToken("Not authenticated"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::InvalidToken("Invalid authorization header"))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::InvalidToken("Invalid authorization header"));
    }

    Ok(token.trim())
}

/// Verify an access token against the codec and the token store
pub async fn verify_access_token(
    codec: &TokenCodec,
    tokens: &dyn TokenStore,
    token: &str,
) -> Result<Principal, AuthError> {
    let claims = match codec.verify(token) {
        Ok(claims) => claims,
        Err(CodecError::Expired) => {
            if let Err(e) = tokens.deactivate(TokenKind::Access, token).await {
                tracing::warn!("Failed to deactivate expired access token: {}", e);
            }
            return Err(AuthError::TokenExpired);
        }
        Err(e) => {
            tracing::warn!("Rejected access token: {}", e);
            return Err(AuthError::InvalidToken("Invalid token"));
        }
    };

    let (email, user_id) = match (claims.sub, claims.user_id) {
        (Some(email), Some(user_id)) => (email, user_id),
        _ => return Err(AuthError::InvalidToken("Invalid token payload")),
    };
    let user_id = Uuid::parse_str(&user_id).map_err(|_| AuthError::InvalidToken("Invalid token payload"))?;

    let record = tokens
        .find(TokenKind::Access, token)
        .await?
        .ok_or(AuthError::InvalidToken("Token not found or revoked"))?;

    if record.is_expired_at(Utc::now()) {
        tokens.deactivate(TokenKind::Access, token).await?;
        return Err(AuthError::TokenExpired);
    }
    if !record.is_active {
        return Err(AuthError::TokenInactive);
    }

    Ok(Principal { user_id, email })
}

/// Authentication middleware
///
/// Attaches the `Principal` to request extensions on success; otherwise
/// responds 401 in the error envelope with a `WWW-Authenticate: Bearer`
/// header.
pub async fn auth_middleware(
    State(sessions): State<SessionManager>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = match bearer_token(request.headers()) {
        Ok(token) => verify_access_token(sessions.codec(), sessions.tokens().as_ref(), token).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(principal) => {
            tracing::debug!("Authenticated user {}", principal.user_id);
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Authentication failed: {}", e);
            let mut response = BackendError::from(e).into_response();
            let (name, value) = bearer_challenge();
            response.headers_mut().insert(name, value);
            response
        }
    }
}

/// Axum extractor for the authenticated caller
///
/// Only usable on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("Principal not found in request extensions");
                BackendError::from(AuthError::InvalidToken("Not authenticated"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::sessions::Claims;
    use crate::backend::auth::tokens::{MemoryTokenStore, TokenRecord};
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Algorithm::HS256)
    }

    async fn stored_token(
        store: &MemoryTokenStore,
        claims: Claims,
        issued: chrono::DateTime<Utc>,
        ttl: Duration,
    ) -> String {
        let user_id = claims
            .user_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
            .unwrap_or_else(Uuid::new_v4);
        let (token, expires_at) = codec().sign(claims, issued, ttl).unwrap();
        store
            .insert(TokenKind::Access, &TokenRecord::new(token.clone(), user_id, issued, expires_at))
            .await
            .unwrap();
        token
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_matches!(bearer_token(&headers), Err(AuthError::InvalidToken(_)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_matches!(bearer_token(&headers), Err(AuthError::InvalidToken(_)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_matches!(bearer_token(&headers), Err(AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_valid_token() {
        let store = MemoryTokenStore::new();
        let user_id = Uuid::new_v4();
        let token = stored_token(&store, Claims::new("ana@x.com", user_id), Utc::now(), Duration::minutes(15)).await;

        let principal = verify_access_token(&codec(), &store, &token).await.unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let store = MemoryTokenStore::new();
        assert_matches!(
            verify_access_token(&codec(), &store, "garbage").await,
            Err(AuthError::InvalidToken("Invalid token"))
        );
    }

    #[tokio::test]
    async fn test_expired_token_deactivates_record() {
        let store = MemoryTokenStore::new();
        let issued = Utc::now() - Duration::hours(1);
        let token = stored_token(&store, Claims::new("ana@x.com", Uuid::new_v4()), issued, Duration::minutes(15)).await;

        assert_matches!(verify_access_token(&codec(), &store, &token).await, Err(AuthError::TokenExpired));
        assert!(!store.find(TokenKind::Access, &token).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_missing_claims() {
        let store = MemoryTokenStore::new();
        let mut claims = Claims::new("ana@x.com", Uuid::new_v4());
        claims.sub = None;
        let token = stored_token(&store, claims, Utc::now(), Duration::minutes(15)).await;
        assert_matches!(
            verify_access_token(&codec(), &store, &token).await,
            Err(AuthError::InvalidToken("Invalid token payload"))
        );

        let mut claims = Claims::new("ana@x.com", Uuid::new_v4());
        claims.user_id = Some("not-a-uuid".to_string());
        let token = stored_token(&store, claims, Utc::now(), Duration::minutes(15)).await;
        assert_matches!(
            verify_access_token(&codec(), &store, &token).await,
            Err(AuthError::InvalidToken("Invalid token payload"))
        );
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = MemoryTokenStore::new();
        let (token, _) = codec()
            .sign(Claims::new("ana@x.com", Uuid::new_v4()), Utc::now(), Duration::minutes(15))
            .unwrap();
        assert_matches!(
            verify_access_token(&codec(), &store, &token).await,
            Err(AuthError::InvalidToken("Token not found or revoked"))
        );
    }

    #[tokio::test]
    async fn test_record_expiry_wins_over_signature() {
        let store = MemoryTokenStore::new();
        let user_id = Uuid::new_v4();
        let (token, _) = codec()
            .sign(Claims::new("ana@x.com", user_id), Utc::now(), Duration::minutes(15))
            .unwrap();
        let past = Utc::now() - Duration::minutes(30);
        store
            .insert(
                TokenKind::Access,
                &TokenRecord::new(token.clone(), user_id, past, past + Duration::minutes(15)),
            )
            .await
            .unwrap();

        assert_matches!(verify_access_token(&codec(), &store, &token).await, Err(AuthError::TokenExpired));
        assert!(!store.find(TokenKind::Access, &token).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_inactive_token() {
        let store = MemoryTokenStore::new();
        let token = stored_token(&store, Claims::new("ana@x.com", Uuid::new_v4()), Utc::now(), Duration::minutes(15)).await;
        store.deactivate(TokenKind::Access, &token).await.unwrap();

        assert_matches!(verify_access_token(&codec(), &store, &token).await, Err(AuthError::TokenInactive));
    }
}
