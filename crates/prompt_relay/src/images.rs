use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode raw image bytes as a PNG data URI.
pub fn to_data_uri(image: &[u8]) -> String {
    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + image.len().div_ceil(3) * 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(image, &mut uri);
    uri
}

/// Hex-encoded SHA-256 of the decoded image bytes.
pub fn content_hash(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}
