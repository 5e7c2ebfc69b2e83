//! Notification events published after a status transition.

use common::{ClientId, RentalRequestId};
use serde::{Deserialize, Serialize};

use super::{RentalRequest, RentalStatus};

/// The name of a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentalEventKind {
    #[serde(rename = "rental.confirmed")]
    Confirmed,
    #[serde(rename = "rental.canceled")]
    Canceled,
    #[serde(rename = "rental.activated")]
    Activated,
}

impl RentalEventKind {
    /// Returns the event name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalEventKind::Confirmed => "rental.confirmed",
            RentalEventKind::Canceled => "rental.canceled",
            RentalEventKind::Activated => "rental.activated",
        }
    }
}

impl std::fmt::Display for RentalEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message body consumed by the contract generation queue.
///
/// ```json
/// {"event": "rental.confirmed",
///  "payload": {"email": "a@b.c", "rental_request_id": 1, "status": "confirmed", "user": "kc-id"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalEvent {
    pub event: RentalEventKind,
    pub payload: RentalEventPayload,
}

/// Data carried by every rental event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalEventPayload {
    pub email: String,
    pub rental_request_id: RentalRequestId,
    pub status: RentalStatus,
    pub user: ClientId,
}

impl RentalEvent {
    /// Builds the event for a request that has just reached its new status.
    pub fn new(kind: RentalEventKind, request: &RentalRequest, email: impl Into<String>) -> Self {
        Self {
            event: kind,
            payload: RentalEventPayload {
                email: email.into(),
                rental_request_id: request.id,
                status: request.status,
                user: request.client.clone(),
            },
        }
    }

    /// Serializes the event to the JSON bytes sent to the broker.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::NewRentalRequest;

    #[test]
    fn test_wire_shape() {
        let now = Utc::now();
        let mut request = RentalRequest::from_new(
            RentalRequestId::new(12),
            NewRentalRequest::new("kc-42", now, now + Duration::days(1)),
        );
        request.status = RentalStatus::Confirmed;

        let event = RentalEvent::new(RentalEventKind::Confirmed, &request, "renter@example.com");
        let value: serde_json::Value =
            serde_json::from_slice(&event.to_json_bytes().unwrap()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "event": "rental.confirmed",
                "payload": {
                    "email": "renter@example.com",
                    "rental_request_id": 12,
                    "status": "confirmed",
                    "user": "kc-42"
                }
            })
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RentalEventKind::Confirmed.to_string(), "rental.confirmed");
        assert_eq!(RentalEventKind::Canceled.to_string(), "rental.canceled");
        assert_eq!(RentalEventKind::Activated.to_string(), "rental.activated");
    }
}
