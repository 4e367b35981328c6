/*
 * Responsibility
 * - HTTP 境界の AppError 定義 (401 / 403)
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthError はどの variant でも同じ 401 に潰す (どの検証で落ちたかはクライアントに返さない)
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,
}

#[derive(Serialize)]
struct ErrorResponseBody {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        };

        let body = ErrorResponseBody {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(_: AuthError) -> Self {
        AppError::Unauthorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, Option<HeaderValue>, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let challenge = response.headers().get(header::WWW_AUTHENTICATE).cloned();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, challenge, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn every_auth_error_renders_the_same_401() {
        let variants = [
            AuthError::Malformed,
            AuthError::BadSignature,
            AuthError::IssuerMismatch,
            AuthError::AudienceMismatch,
            AuthError::MissingExpiration,
            AuthError::Expired,
        ];

        let (_, _, expected) = body_of(AppError::Unauthorized).await;
        for variant in variants {
            let (status, challenge, body) = body_of(variant.into()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(challenge.as_ref().map(|v| v.as_bytes()), Some(&b"Bearer"[..]));
            assert_eq!(body, expected);
        }
    }

    #[tokio::test]
    async fn forbidden_has_no_challenge() {
        let (status, challenge, body) = body_of(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(challenge.is_none());
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }
}
