//! Identifier types shared across the rental requests workspace.

mod types;

pub use types::{ClientId, ParseRentalRequestIdError, RentalRequestId};
