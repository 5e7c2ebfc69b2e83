use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{NewRentalRequest, RentalRequest, Transition};
use tokio::sync::RwLock;

use crate::{
    RentalQuery, RentalRequestId, Result, StoreError,
    store::{RentalStore, StatusChange},
};

#[derive(Debug, Default)]
struct InMemoryState {
    rows: BTreeMap<RentalRequestId, RentalRequest>,
    last_id: i64,
    unavailable: bool,
}

/// In-memory rental store implementation for testing and local runs.
///
/// This implementation keeps all rows in memory and provides the same
/// interface as the PostgreSQL implementation. Status transitions check and
/// write under a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryRentalStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryRentalStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored requests.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Returns true if no requests are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Makes every subsequent call fail as if the database were down.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    fn check_available(state: &InMemoryState) -> Result<()> {
        if state.unavailable {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RentalStore for InMemoryRentalStore {
    async fn insert(&self, request: NewRentalRequest) -> Result<RentalRequest> {
        let mut state = self.state.write().await;
        Self::check_available(&state)?;

        state.last_id += 1;
        let id = RentalRequestId::new(state.last_id);
        let stored = RentalRequest::from_new(id, request);
        state.rows.insert(id, stored.clone());

        Ok(stored)
    }

    async fn get(&self, id: RentalRequestId) -> Result<Option<RentalRequest>> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.rows.get(&id).cloned())
    }

    async fn list(&self, query: RentalQuery) -> Result<Vec<RentalRequest>> {
        let state = self.state.read().await;
        Self::check_available(&state)?;

        // BTreeMap iteration is already ordered by id
        Ok(state
            .rows
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    async fn apply_transition(
        &self,
        id: RentalRequestId,
        transition: Transition,
    ) -> Result<StatusChange> {
        let mut state = self.state.write().await;
        Self::check_available(&state)?;

        let Some(row) = state.rows.get_mut(&id) else {
            return Ok(StatusChange::NotFound);
        };

        if !transition.permits(row.status) {
            return Ok(StatusChange::Rejected {
                current: row.status,
            });
        }

        row.status = transition.target();
        Ok(StatusChange::Applied(row.clone()))
    }
}
