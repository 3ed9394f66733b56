use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::{ApiError, ServerState};
use crate::storage::LogEntry;

const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Debug, Deserialize)]
pub(super) struct AdminLogsQuery {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AdminLogsResponse {
    logs: Vec<LogEntry>,
}

/// Compare secrets without leaking the position of the first mismatch.
fn credential_matches(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    if expected.len() != provided.len() {
        return false;
    }
    expected.ct_eq(provided).into()
}

pub(super) async fn admin_logs(
    State(state): State<ServerState>,
    headers: HeaderMap,
    query: Result<Query<AdminLogsQuery>, QueryRejection>,
) -> Result<Json<AdminLogsResponse>, ApiError> {
    let config = state.ctx().config();
    let Some(expected) = config.admin_password.as_deref() else {
        return Err(ApiError::AdminNotConfigured);
    };

    let provided = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        // An unparsable query string carries no usable credential.
        .or_else(|| query.ok().and_then(|Query(params)| params.password));

    match provided {
        Some(provided) if credential_matches(expected, &provided) => {}
        _ => {
            warn!("rejected admin log request");
            return Err(ApiError::Forbidden);
        }
    }

    match state.ctx().logs().read_all().await {
        Ok(logs) => Ok(Json(AdminLogsResponse { logs })),
        Err(err) => {
            warn!(error = ?err, "failed to read log store");
            Err(ApiError::LogRead(err))
        }
    }
}
