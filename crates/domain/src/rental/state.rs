//! Rental request status state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The status of a rental request in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Confirmed ──► Active
///    │            │           │
///    └────────────┴───────────┴──► Canceled
///
/// place_reservation: Confirmed | Active ──► Pending
/// activate:          Pending ──► Active
/// ```
///
/// `Canceled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    /// Created by the booking flow, awaiting confirmation.
    #[default]
    Pending,

    /// Accepted by the rental provider.
    Confirmed,

    /// Equipment handed over, rental in progress.
    Active,

    /// Withdrawn (terminal state).
    Canceled,
}

impl RentalStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [RentalStatus; 4] = [
        RentalStatus::Pending,
        RentalStatus::Confirmed,
        RentalStatus::Active,
        RentalStatus::Canceled,
    ];

    /// Returns true if a reservation can be (re)placed from this status.
    pub fn can_place(&self) -> bool {
        matches!(self, RentalStatus::Confirmed | RentalStatus::Active)
    }

    /// Returns true if the request can be confirmed from this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, RentalStatus::Pending)
    }

    /// Returns true if the request can be canceled from this status.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the request can be activated from this status.
    pub fn can_activate(&self) -> bool {
        matches!(self, RentalStatus::Pending | RentalStatus::Confirmed)
    }

    /// Returns true if no operation may move the request out of this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Canceled)
    }

    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Active => "active",
            RentalStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rental status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for RentalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RentalStatus::Pending),
            "confirmed" => Ok(RentalStatus::Confirmed),
            "active" => Ok(RentalStatus::Active),
            "canceled" => Ok(RentalStatus::Canceled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
