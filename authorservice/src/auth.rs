use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use paperclip::actix::Apiv2Security;
use serde::{Deserialize, Serialize};

use crate::api::ErrorBody;

const TOKEN_VALIDITY_SECS: u64 = 3600;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Authorization header with a Bearer token is required")]
    MissingToken,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("Failed to sign token: {0}")]
    TokenCreation(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to process password: {0}")]
    PasswordHash(String),

    #[error("Token issuer is not configured")]
    IssuerNotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => {
                actix_web::http::StatusCode::UNAUTHORIZED
            }
            AuthError::TokenCreation(_)
            | AuthError::PasswordHash(_)
            | AuthError::IssuerNotConfigured => {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

/// Issues and validates HS256 tokens carrying the username claim,
/// valid for one hour from issuance.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity_secs: TOKEN_VALIDITY_SECS,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        let claims = Claims {
            sub: username.to_string(),
            exp: get_current_timestamp() + self.validity_secs,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact, a token is rejected the second it lapses
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::PasswordHash(err.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Extracts and validates the bearer token of a protected route,
/// rejecting the request with 401 before the handler runs.
#[derive(Apiv2Security, Deserialize)]
#[openapi(
    apiKey,
    alias = "JWT",
    in = "header",
    name = "Authorization",
    description = "Use format 'Bearer TOKEN', issued by /api/auth/login"
)]
pub struct BearerAuth(pub Claims);

impl FromRequest for BearerAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(bearer_auth_from_request(req))
    }
}

fn bearer_auth_from_request(req: &HttpRequest) -> Result<BearerAuth, AuthError> {
    let token_issuer = req
        .app_data::<Data<Arc<TokenIssuer>>>()
        .ok_or(AuthError::IssuerNotConfigured)?;

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    token_issuer.validate(token).map(BearerAuth)
}

#[cfg(test)]
mod auth_tests {
    use jsonwebtoken::{encode, get_current_timestamp, Header};

    use super::{hash_password, verify_password, Claims, TokenIssuer};

    #[test]
    fn test_issue_and_validate_token() {
        let issuer = TokenIssuer::new(b"test-secret");

        let token = issuer.issue("alice").expect("Failed to issue token");
        let claims = issuer.validate(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > get_current_timestamp());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = TokenIssuer::new(b"test-secret");
        let other_issuer = TokenIssuer::new(b"other-secret");

        let token = other_issuer.issue("alice").expect("Failed to issue token");
        assert!(issuer.validate(&token).is_err());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let issuer = TokenIssuer::new(b"test-secret");
        assert!(issuer.validate("not-a-token").is_err());
        assert!(issuer.validate("").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new(b"test-secret");

        let expired_claims = Claims {
            sub: "alice".to_string(),
            exp: get_current_timestamp() - 120,
        };
        let token = encode(&Header::default(), &expired_claims, &issuer.encoding_key)
            .expect("Failed to encode token");

        assert!(issuer.validate(&token).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }
}
