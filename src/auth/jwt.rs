use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind,
};
use thiserror::Error;

use crate::auth::types::Claims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed token")]
    Malformed,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

/// Identity fields embedded into an issued token.
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: i32,
    pub username: &'a str,
    pub role_id: i32,
    pub role_name: &'a str,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    secret: Arc<[u8]>,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            secret: Arc::from(secret.as_bytes()),
            expiration_hours,
        }
    }

    pub fn generate_token(
        &self,
        subject: &TokenSubject<'_>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate_token_at(subject, Utc::now().timestamp())
    }

    pub fn generate_token_at(
        &self,
        subject: &TokenSubject<'_>,
        now: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            user_id: subject.user_id,
            username: subject.username.to_string(),
            role_id: subject.role_id,
            role_name: subject.role_name.to_string(),
            exp: now + Duration::hours(self.expiration_hours).num_seconds(),
            iat: now,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, VerifyError> {
        verify(token, &self.secret, Utc::now().timestamp())
    }
}

/// Verify an HS256 token against `secret` at instant `now` (unix seconds).
///
/// Pure: no shared state, safe to call from any request context.
pub fn verify(token: &str, secret: &[u8], now: i64) -> Result<Claims, VerifyError> {
    let header = decode_header(token).map_err(|_| VerifyError::Malformed)?;
    if header.alg != Algorithm::HS256 {
        return Err(VerifyError::UnexpectedAlgorithm);
    }

    // Expiry is checked against the caller's clock below, not the library's.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).map_err(
        |e| match e.kind() {
            ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => VerifyError::UnexpectedAlgorithm,
            _ => VerifyError::Malformed,
        },
    )?;

    if data.claims.exp <= now {
        return Err(VerifyError::Expired);
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            user_id: 7,
            username: "alice",
            role_id: 2,
            role_name: "editor",
        }
    }

    #[test]
    fn valid_token_round_trips_claims() {
        let service = JwtService::new(SECRET, 24);
        let now = 1_700_000_000;
        let token = service.generate_token_at(&subject(), now).unwrap();

        let claims = verify(&token, SECRET.as_bytes(), now + 60).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role_id, 2);
        assert_eq!(claims.role_name, "editor");
        assert_eq!(claims.exp, now + 24 * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = JwtService::new(SECRET, 24);
        let now = 1_700_000_000;
        let token = service.generate_token_at(&subject(), now).unwrap();

        let err = verify(&token, SECRET.as_bytes(), now + 24 * 3600 + 1).unwrap_err();
        assert_eq!(err, VerifyError::Expired);
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let service = JwtService::new(SECRET, 24);
        let now = Utc::now().timestamp();
        let token = service.generate_token_at(&subject(), now).unwrap();

        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{head}.{flipped}{}", &sig[1..]);

        let err = verify(&tampered, SECRET.as_bytes(), now).unwrap_err();
        assert_eq!(err, VerifyError::InvalidSignature);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let service = JwtService::new(SECRET, 24);
        let now = Utc::now().timestamp();
        let token = service.generate_token_at(&subject(), now).unwrap();

        let err = verify(&token, b"another-secret", now).unwrap_err();
        assert_eq!(err, VerifyError::InvalidSignature);
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            username: "root".into(),
            role_id: 1,
            role_name: "admin".into(),
            exp: now + 3600,
            iat: now,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify(&token, SECRET.as_bytes(), now).unwrap_err();
        assert_eq!(err, VerifyError::UnexpectedAlgorithm);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = verify("not-a-token", SECRET.as_bytes(), 0).unwrap_err();
        assert_eq!(err, VerifyError::Malformed);
    }
}
