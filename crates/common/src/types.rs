use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a rental request.
///
/// Assigned by the store on insert. Serialized as a bare integer so that
/// downstream consumers of the notification queue see `rental_request_id: 42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RentalRequestId(i64);

impl RentalRequestId {
    /// Wraps a raw store identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RentalRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RentalRequestId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RentalRequestId> for i64 {
    fn from(id: RentalRequestId) -> Self {
        id.0
    }
}

/// Error returned when a path segment is not a valid rental request id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rental request id: {0:?}")]
pub struct ParseRentalRequestIdError(String);

impl FromStr for RentalRequestId {
    type Err = ParseRentalRequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ParseRentalRequestIdError(s.to_string()))
    }
}

/// Opaque identifier of the end user who owns a rental request.
///
/// This is the subject id issued by the identity provider. The service never
/// interprets it beyond passing it to the user-detail lookup and echoing it in
/// notification payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a client id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rental_request_id_parses_from_path_segment() {
        let id: RentalRequestId = "42".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn rental_request_id_rejects_non_numeric_input() {
        let err = "abc".parse::<RentalRequestId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid rental request id: \"abc\"");
    }

    #[test]
    fn rental_request_id_serializes_as_integer() {
        let json = serde_json::to_string(&RentalRequestId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn client_id_serializes_as_plain_string() {
        let id = ClientId::new("f3b1c0de-user");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"f3b1c0de-user\"");

        let back: ClientId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn client_id_blank_detection() {
        assert!(ClientId::new("   ").is_blank());
        assert!(!ClientId::new("abc").is_blank());
    }
}
