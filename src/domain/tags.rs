// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Tags Value Object

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Tag validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Too many tags: {0} (Azure allows at most 50)")]
    TooMany(usize),

    #[error("Tag name is empty")]
    EmptyKey,

    #[error("Tag name exceeds 512 characters: {0}")]
    KeyTooLong(String),

    #[error("Tag name contains reserved character {ch:?}: {key}")]
    ReservedCharacter { key: String, ch: char },

    #[error("Tag value for {key} exceeds 256 characters")]
    ValueTooLong { key: String },
}

/// Tags applied to every taggable resource of a run
///
/// Invariants:
/// - At most 50 entries
/// - Names are 1-512 characters without `<>%&\?/`
/// - Values are at most 256 characters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub const MAX_TAGS: usize = 50;
    pub const MAX_KEY_LENGTH: usize = 512;
    pub const MAX_VALUE_LENGTH: usize = 256;
    const RESERVED: &'static str = "<>%&\\?/";

    pub fn new(entries: BTreeMap<String, String>) -> Result<Self, TagError> {
        if entries.len() > Self::MAX_TAGS {
            return Err(TagError::TooMany(entries.len()));
        }

        for (key, value) in &entries {
            if key.is_empty() {
                return Err(TagError::EmptyKey);
            }
            if key.chars().count() > Self::MAX_KEY_LENGTH {
                return Err(TagError::KeyTooLong(key.clone()));
            }
            if let Some(ch) = key.chars().find(|ch| Self::RESERVED.contains(*ch)) {
                return Err(TagError::ReservedCharacter {
                    key: key.clone(),
                    ch,
                });
            }
            if value.chars().count() > Self::MAX_VALUE_LENGTH {
                return Err(TagError::ValueTooLong { key: key.clone() });
            }
        }

        Ok(Self(entries))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, String>::deserialize(deserializer)?;
        Self::new(entries).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_tags() {
        let t = Tags::new(tags(&[("environment", "test")])).unwrap();
        assert_eq!(t.get("environment"), Some("test"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_reserved_characters() {
        assert_eq!(
            Tags::new(tags(&[("cost/center", "x")])),
            Err(TagError::ReservedCharacter {
                key: "cost/center".to_string(),
                ch: '/'
            })
        );
        assert_eq!(Tags::new(tags(&[("", "x")])), Err(TagError::EmptyKey));
    }

    #[test]
    fn test_limits() {
        let many: BTreeMap<String, String> =
            (0..51).map(|i| (format!("k{i}"), "v".to_string())).collect();
        assert_eq!(Tags::new(many), Err(TagError::TooMany(51)));

        let long_value = "v".repeat(257);
        assert!(matches!(
            Tags::new(tags(&[("k", long_value.as_str())])),
            Err(TagError::ValueTooLong { .. })
        ));
    }
}
