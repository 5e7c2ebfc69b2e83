//! Domain error types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::rental::{RentalStatus, Transition};

/// A transition was requested from a status its guard does not permit.
///
/// Nothing was written. `current` is the persisted status at the time of the
/// attempt so callers can react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct ConflictError {
    pub transition: Transition,
    pub current: RentalStatus,
}

impl ConflictError {
    pub fn new(transition: Transition, current: RentalStatus) -> Self {
        Self {
            transition,
            current,
        }
    }

    /// Human-readable reason the guard refused the transition.
    pub fn message(&self) -> String {
        match (self.transition, self.current) {
            (Transition::Place, RentalStatus::Pending) => {
                "Reservation already placed or not allowed.".to_string()
            }
            (Transition::Confirm, RentalStatus::Confirmed) => "Already confirmed.".to_string(),
            (Transition::Cancel, RentalStatus::Canceled) => "Already canceled.".to_string(),
            (Transition::Activate, RentalStatus::Active) => "Already active.".to_string(),
            (transition, current) => {
                format!("Cannot {transition} a rental request that is {current}.")
            }
        }
    }
}

/// Errors raised when a creation payload breaks a field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The owning user id is missing.
    #[error("client is required")]
    ClientRequired,

    /// A string field exceeds its column width.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// The rental ends before it starts.
    #[error("end_date {end_date} is before start_date {start_date}")]
    InvalidDateRange {
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    },

    /// Quantity must be positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i32 },

    /// Price is negative or does not fit in 10 digits with 2 decimals.
    #[error("Invalid total_price: {price}")]
    InvalidPrice { price: Decimal },
}
