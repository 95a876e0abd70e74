//! Blob encoding for the moment list
//!
//! The durable form is a JSON array of moments. Image bytes are carried as
//! standard base64 strings under `imageDatas`, timestamps as RFC 3339
//! strings under `date`.

use crate::models::Moment;

/// Encode the ordered moment list into the stored blob format
pub fn encode(moments: &[Moment]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(moments)
}

/// Decode a stored blob back into the ordered moment list
pub fn decode(bytes: &[u8]) -> serde_json::Result<Vec<Moment>> {
    serde_json::from_slice(bytes)
}

/// Serde adapter for a list of byte buffers as base64 strings
pub(crate) mod base64_list {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(images: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(images.iter().map(|bytes| STANDARD.encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|s| STANDARD.decode(s).map_err(D::Error::custom))
            .collect()
    }
}
