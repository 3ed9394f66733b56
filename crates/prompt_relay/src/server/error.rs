use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Prompt is required")]
    MissingPrompt,

    #[error("Upstream API token is not configured")]
    UpstreamNotConfigured,

    #[error("Admin password is not configured")]
    AdminNotConfigured,

    #[error("Forbidden")]
    Forbidden,

    /// Non-success reply from the inference API, relayed unchanged.
    #[error("inference API returned status {status}")]
    Upstream {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },

    #[error("Failed to read logs")]
    LogRead(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingPrompt => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UpstreamNotConfigured
            | ApiError::AdminNotConfigured
            | ApiError::LogRead(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        };

        match self {
            ApiError::Upstream {
                status: upstream_status,
                content_type,
                body,
            } => {
                let status = StatusCode::from_u16(upstream_status).unwrap_or(status);
                let mut response = (status, body).into_response();
                match content_type.and_then(|value| HeaderValue::from_str(&value).ok()) {
                    Some(value) => {
                        response.headers_mut().insert(CONTENT_TYPE, value);
                    }
                    None => {
                        response.headers_mut().remove(CONTENT_TYPE);
                    }
                }
                response
            }
            ApiError::Internal(err) => (
                status,
                Json(ErrorBody {
                    error: format!("{err:#}"),
                }),
            )
                .into_response(),
            other => (
                status,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use http_body_util::BodyExt;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn upstream_failure_is_relayed_verbatim() {
        let response = ApiError::Upstream {
            status: 429,
            content_type: Some("text/plain".to_string()),
            body: b"rate limited".to_vec(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_string(response).await, "rate limited");
    }

    #[tokio::test]
    async fn internal_error_exposes_message_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = err.context("sending request to inference API").unwrap_err();
        let response = ApiError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            payload["error"],
            "sending request to inference API: connection refused"
        );
    }

    #[tokio::test]
    async fn forbidden_carries_only_the_error() {
        let response = ApiError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, r#"{"error":"Forbidden"}"#);
    }
}
