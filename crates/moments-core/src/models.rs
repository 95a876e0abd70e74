//! Data models for Moments
//!
//! Defines the single journal entry type, `Moment`. Field names on the wire
//! follow the stored blob format (`date`, `imageDatas`), see `codec`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dated journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Moment {
    /// Unique identifier, fixed at creation
    pub id: Uuid,
    /// When this moment was recorded, fixed at creation
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    /// Free-form text
    pub description: String,
    /// Raw encoded image bytes, in display order
    #[serde(rename = "imageDatas", with = "crate::codec::base64_list")]
    pub images: Vec<Vec<u8>>,
    /// Mood score, 0.0 (most negative) to 1.0 (most positive).
    /// Not clamped here.
    pub emotion: f64,
}

impl Moment {
    /// Create a new moment stamped with the current time
    pub fn new(description: impl Into<String>, images: Vec<Vec<u8>>, emotion: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            description: description.into(),
            images,
            emotion,
        }
    }

    /// Replace the mutable fields with those of `other`
    ///
    /// `id` and `timestamp` are left untouched.
    pub fn replace_content(&mut self, other: &Moment) {
        self.description = other.description.clone();
        self.images = other.images.clone();
        self.emotion = other.emotion;
    }

    /// Timestamp in the display format used across the app
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_moment_new() {
        let before = Utc::now();
        let moment = Moment::new("Sunny day", Vec::new(), 0.8);
        assert_eq!(moment.description, "Sunny day");
        assert!(moment.images.is_empty());
        assert_eq!(moment.emotion, 0.8);
        assert!(moment.timestamp >= before);
    }

    #[test]
    fn test_moment_ids_are_unique() {
        let a = Moment::new("a", Vec::new(), 0.5);
        let b = Moment::new("b", Vec::new(), 0.5);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_replace_content_keeps_identity() {
        let mut original = Moment::new("before", vec![vec![1, 2, 3]], 0.1);
        let id = original.id;
        let timestamp = original.timestamp;

        let mut replacement = Moment::new("after", Vec::new(), 0.9);
        replacement.timestamp = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        original.replace_content(&replacement);

        assert_eq!(original.id, id);
        assert_eq!(original.timestamp, timestamp);
        assert_eq!(original.description, "after");
        assert!(original.images.is_empty());
        assert_eq!(original.emotion, 0.9);
    }

    #[test]
    fn test_formatted_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        let mut moment = Moment::new("", Vec::new(), 0.5);
        moment.timestamp = ts;
        assert_eq!(moment.formatted_timestamp(), "2024-03-09 07:05:02");
    }

    #[test]
    fn test_serialized_field_names() {
        let moment = Moment::new("Field names", vec![b"abc".to_vec()], 0.25);
        let value = serde_json::to_value(&moment).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("date"));
        assert!(obj.contains_key("description"));
        assert!(obj.contains_key("imageDatas"));
        assert!(obj.contains_key("emotion"));
        assert_eq!(obj["imageDatas"][0], "YWJj");
    }
}
