//! Identifiers and outcomes shared by the store and the HTTP layer.

use crate::error::WatchError;
use std::fmt;

/// Longest identifier accepted for either a user or a stream.
pub const MAX_ID_LEN: usize = 256;

/// Separator used when listing a user's streams; forbidden inside identifiers.
pub const LIST_SEPARATOR: &str = ",";

fn validate(field: &'static str, raw: &str) -> Result<(), WatchError> {
    let reason = if raw.is_empty() {
        "must not be empty"
    } else if raw.len() > MAX_ID_LEN {
        "too long"
    } else if raw.contains(LIST_SEPARATOR) {
        "must not contain ','"
    } else {
        return Ok(());
    };
    Err(WatchError::InvalidId { field, reason })
}

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, WatchError> {
        let raw = raw.into();
        validate("user_id", &raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque stream identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, WatchError> {
        let raw = raw.into();
        validate("stream_id", &raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Successful result of adding a stream to a user's watch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The stream was not watched before and now is.
    Added,
    /// The stream was already being watched; nothing changed.
    AlreadyWatching,
}

impl AddOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddOutcome::Added => "added",
            AddOutcome::AlreadyWatching => "already_watching",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_opaque_ids() {
        assert_eq!(UserId::parse("charles").unwrap().as_str(), "charles");
        assert_eq!(StreamId::parse("boxing1").unwrap().to_string(), "boxing1");
        assert!(StreamId::parse("with space:and-colon").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = UserId::parse("").unwrap_err();
        assert!(matches!(
            err,
            WatchError::InvalidId {
                field: "user_id",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_separator() {
        let err = StreamId::parse("a,b").unwrap_err();
        assert!(matches!(
            err,
            WatchError::InvalidId {
                field: "stream_id",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_oversized() {
        let raw = "x".repeat(MAX_ID_LEN + 1);
        assert!(StreamId::parse(raw).is_err());
        assert!(StreamId::parse("x".repeat(MAX_ID_LEN)).is_ok());
    }
}
