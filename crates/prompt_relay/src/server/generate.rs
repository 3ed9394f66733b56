use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiError, ServerState};
use crate::{images, storage::LogEntry, upstream::UpstreamReply};

/// Images requested from the inference API for every prompt.
pub const IMAGES_PER_REQUEST: usize = 3;

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateResponse {
    image: Vec<String>,
}

/// Malformed bodies, non-string and empty prompts count as a missing prompt.
/// Whitespace-only prompts are forwarded as given.
fn parse_prompt(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<GenerateRequest>(body)
        .ok()
        .and_then(|request| request.prompt)
        .filter(|prompt| !prompt.is_empty())
}

pub(super) async fn generate(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = parse_prompt(&body).ok_or(ApiError::MissingPrompt)?;
    let client = state.ctx().images().ok_or(ApiError::UpstreamNotConfigured)?;

    // Calls run one after another; the first failure ends the request.
    let mut generated = Vec::with_capacity(IMAGES_PER_REQUEST);
    for attempt in 1..=IMAGES_PER_REQUEST {
        match client.generate(&prompt).await? {
            UpstreamReply::Image(bytes) => generated.push(bytes),
            UpstreamReply::Failure {
                status,
                content_type,
                body,
            } => {
                warn!(status, attempt, "inference API call failed");
                return Err(ApiError::Upstream {
                    status,
                    content_type,
                    body,
                });
            }
        }
    }

    let image_hashes = generated
        .iter()
        .map(|image| images::content_hash(image))
        .collect();
    let data_uris = generated
        .iter()
        .map(|image| images::to_data_uri(image))
        .collect();

    let entry = LogEntry::new(Utc::now(), prompt, image_hashes, client.model());
    if let Err(err) = state.ctx().logs().append(&entry).await {
        warn!(error = ?err, "failed to append generation log entry");
    }
    info!(model = client.model(), images = IMAGES_PER_REQUEST, "generated images");

    Ok(Json(GenerateResponse { image: data_uris }))
}
