use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use shared_models::auth::{Identity, JwtClaims};

use crate::validation::normalize_email;

/// Verify an identity-provider access token (HS256, shared secret) and derive
/// the acting identity from its claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Identity, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    // Provider tokens carry a generic audience ("authenticated"); it says
    // nothing about this API, so it is not checked.
    validation.validate_aud = false;

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Token rejected: {}", e);
        match e.kind() {
            ErrorKind::ExpiredSignature => "Token expired".to_string(),
            ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
            _ => "Invalid token".to_string(),
        }
    })?;

    let claims = data.claims;

    let email = claims
        .email
        .as_deref()
        .ok_or_else(|| "Token carries no email".to_string())
        .and_then(normalize_email)?;

    let role = claims
        .app_role()
        .ok_or_else(|| "Token carries no patient or doctor role".to_string())?;

    debug!("Token validated successfully for user: {}", claims.sub);
    Ok(Identity {
        subject: claims.sub,
        email,
        role,
    })
}
