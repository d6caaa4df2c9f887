//! Artifact serialization.
//!
//! The store persists opaque bytes; a codec turns caller artifacts into those
//! bytes and back. [`JsonCodec`] is the default.

use crate::error::{Result, VariError};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encodes artifacts for storage.
pub trait ArtifactCodec {
    fn encode<T: Serialize + ?Sized>(&self, artifact: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Indented output, easier to inspect on disk.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ArtifactCodec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, artifact: &T) -> Result<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(artifact)
        } else {
            serde_json::to_vec(artifact)
        };
        encoded.map_err(|e| VariError::Serialization(format!("failed to encode artifact: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| VariError::Serialization(format!("failed to decode artifact: {}", e)))
    }
}
