use super::error::InfrastructureError;

/// Decodes a base64 image payload, with or without a `data:image/...;base64,` prefix.
pub fn decode_image_data(payload: &str) -> Result<Vec<u8>, InfrastructureError> {
    let payload = payload.trim();
    let encoded = if payload.starts_with("data:") {
        payload
            .split(',')
            .nth(1)
            .ok_or_else(|| InfrastructureError::DecodingError("Invalid data URL: missing comma".to_string()))?
    } else {
        payload
    };
    base64::decode(encoded.trim()).map_err(InfrastructureError::Base64DecodeError)
}

pub fn encode_image_data(bytes: &[u8]) -> String {
    base64::encode(bytes)
}
