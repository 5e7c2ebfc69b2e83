use async_trait::async_trait;
use domain::{NewRentalRequest, RentalRequest, RentalStatus, Transition};

use crate::{RentalQuery, RentalRequestId, Result};

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// The guard held and the new status is persisted.
    Applied(RentalRequest),
    /// The guard failed against the persisted status. Nothing was written.
    Rejected { current: RentalStatus },
    /// No request exists with the given id.
    NotFound,
}

/// Core trait for rental request storage.
///
/// The store is the source of truth for status. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Persists a new request in `pending` status and returns it with its id.
    ///
    /// The payload is expected to be validated already.
    async fn insert(&self, request: NewRentalRequest) -> Result<RentalRequest>;

    /// Loads a request by id.
    ///
    /// Returns None if it doesn't exist.
    async fn get(&self, id: RentalRequestId) -> Result<Option<RentalRequest>>;

    /// Lists requests matching every filter set on `query`, ordered by id.
    async fn list(&self, query: RentalQuery) -> Result<Vec<RentalRequest>>;

    /// Applies `transition` if its guard holds for the persisted status.
    ///
    /// Guard check and write happen as one atomic step, so two concurrent
    /// transitions on the same request never interleave: the loser observes
    /// the winner's status and is rejected.
    async fn apply_transition(
        &self,
        id: RentalRequestId,
        transition: Transition,
    ) -> Result<StatusChange>;
}
