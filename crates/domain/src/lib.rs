//! Domain layer for the rental requests service.
//!
//! This crate provides:
//! - The `RentalRequest` entity and its creation payload
//! - The `RentalStatus` state machine and the `Transition` table guarding it
//! - The `RentalEvent` message published when a transition notifies
//! - Conflict and validation errors

pub mod error;
pub mod rental;

pub use error::{ConflictError, ValidationError};
pub use rental::{
    NewRentalRequest, RentalEvent, RentalEventKind, RentalEventPayload, RentalRequest,
    RentalStatus, Transition, UnknownStatus,
};
