//! The four operations that move a rental request between statuses.

use serde::{Deserialize, Serialize};

use super::{RentalEventKind, RentalStatus};

/// A named status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Put the request back into `pending`.
    Place,
    /// `pending` to `confirmed`.
    Confirm,
    /// Any live status to `canceled`.
    Cancel,
    /// Start the rental.
    Activate,
}

impl Transition {
    /// Every transition.
    pub const ALL: [Transition; 4] = [
        Transition::Place,
        Transition::Confirm,
        Transition::Cancel,
        Transition::Activate,
    ];

    /// The status the request holds after the transition succeeds.
    pub fn target(&self) -> RentalStatus {
        match self {
            Transition::Place => RentalStatus::Pending,
            Transition::Confirm => RentalStatus::Confirmed,
            Transition::Cancel => RentalStatus::Canceled,
            Transition::Activate => RentalStatus::Active,
        }
    }

    /// Returns true if the guard holds for `current`.
    pub fn permits(&self, current: RentalStatus) -> bool {
        match self {
            Transition::Place => current.can_place(),
            Transition::Confirm => current.can_confirm(),
            Transition::Cancel => current.can_cancel(),
            Transition::Activate => current.can_activate(),
        }
    }

    /// The statuses from which the transition is legal.
    ///
    /// Stores use this list for their conditional update.
    pub fn allowed_from(&self) -> Vec<RentalStatus> {
        RentalStatus::ALL
            .into_iter()
            .filter(|status| self.permits(*status))
            .collect()
    }

    /// The event published after the transition, if it notifies at all.
    pub fn event_kind(&self) -> Option<RentalEventKind> {
        match self {
            Transition::Place => None,
            Transition::Confirm => Some(RentalEventKind::Confirmed),
            Transition::Cancel => Some(RentalEventKind::Canceled),
            Transition::Activate => Some(RentalEventKind::Activated),
        }
    }

    /// Returns true if the transition resolves the client and publishes an event.
    pub fn notifies(&self) -> bool {
        self.event_kind().is_some()
    }

    /// Returns the operation name used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Place => "place",
            Transition::Confirm => "confirm",
            Transition::Cancel => "cancel",
            Transition::Activate => "activate",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
