//! Rental request entity and related types.

mod entity;
mod events;
mod state;
mod transition;

pub use entity::{NewRentalRequest, RentalRequest};
pub use events::{RentalEvent, RentalEventKind, RentalEventPayload};
pub use state::{RentalStatus, UnknownStatus};
pub use transition::Transition;
