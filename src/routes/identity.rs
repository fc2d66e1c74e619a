//! Caller identity forwarded by the authenticating gateway in front of the service.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use crate::{
    dao::models::PlayerEntity,
    error::{AppError, ServiceError},
};

/// Required player id header.
pub const PLAYER_ID_HEADER: &str = "x-player-id";
/// Required player email header.
pub const PLAYER_EMAIL_HEADER: &str = "x-player-email";
/// Optional display name header; defaults to the email.
pub const PLAYER_USERNAME_HEADER: &str = "x-player-username";

/// Verified player issuing the request.
#[derive(Debug, Clone)]
pub struct Requester(pub PlayerEntity);

impl Requester {
    /// Read the identity headers. The username falls back to the email.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ServiceError> {
        let id = header_value(headers, PLAYER_ID_HEADER).ok_or_else(|| {
            ServiceError::Unauthorized(format!("missing `{PLAYER_ID_HEADER}` header"))
        })?;
        let email = header_value(headers, PLAYER_EMAIL_HEADER).ok_or_else(|| {
            ServiceError::Unauthorized(format!("missing `{PLAYER_EMAIL_HEADER}` header"))
        })?;
        let username =
            header_value(headers, PLAYER_USERNAME_HEADER).unwrap_or_else(|| email.clone());

        Ok(Self(PlayerEntity {
            id,
            email,
            username,
        }))
    }
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers)?)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn username_defaults_to_email() {
        let mut headers = HeaderMap::new();
        headers.insert(PLAYER_ID_HEADER, HeaderValue::from_static("p1"));
        headers.insert(PLAYER_EMAIL_HEADER, HeaderValue::from_static("p1@example.com"));

        let Requester(player) = Requester::from_headers(&headers).unwrap();
        assert_eq!(player.id, "p1");
        assert_eq!(player.username, "p1@example.com");

        headers.insert(PLAYER_USERNAME_HEADER, HeaderValue::from_static("Pat"));
        let Requester(player) = Requester::from_headers(&headers).unwrap();
        assert_eq!(player.username, "Pat");
    }

    #[test]
    fn blank_or_missing_identity_is_unauthorized() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            Requester::from_headers(&headers),
            Err(ServiceError::Unauthorized(_))
        ));

        headers.insert(PLAYER_ID_HEADER, HeaderValue::from_static("  "));
        headers.insert(PLAYER_EMAIL_HEADER, HeaderValue::from_static("p1@example.com"));
        assert!(matches!(
            Requester::from_headers(&headers),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
