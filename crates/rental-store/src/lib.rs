pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{ClientId, RentalRequestId};
pub use error::{Result, StoreError};
pub use memory::InMemoryRentalStore;
pub use postgres::PostgresRentalStore;
pub use query::RentalQuery;
pub use store::{RentalStore, StatusChange};
