use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot encode embedding: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored embedding is not a valid encoding: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Encode an embedding as the persisted blob format: UTF-8 JSON bytes of a
/// float array. Always succeeds for a well-formed vector.
pub fn encode(vector: &[f32]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(vector).map_err(CodecError::Encode)
}

/// Decode a persisted blob back into an embedding.
pub fn decode(blob: &[u8]) -> Result<Vec<f32>, CodecError> {
    serde_json::from_slice(blob).map_err(CodecError::Corrupt)
}
