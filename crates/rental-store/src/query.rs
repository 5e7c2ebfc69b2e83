use domain::RentalRequest;

use crate::ClientId;

/// Exact-match filters for listing rental requests.
///
/// Unset fields do not constrain the result; set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentalQuery {
    pub client: Option<ClientId>,
    pub rental: Option<String>,
    pub equipment: Option<i64>,
}

impl RentalQuery {
    /// Creates a query matching every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by owning client.
    pub fn client(mut self, client: impl Into<ClientId>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Filters by rental reference.
    pub fn rental(mut self, rental: impl Into<String>) -> Self {
        self.rental = Some(rental.into());
        self
    }

    /// Filters by equipment reference.
    pub fn equipment(mut self, equipment: i64) -> Self {
        self.equipment = Some(equipment);
        self
    }

    /// Returns true if `request` satisfies every set filter.
    pub fn matches(&self, request: &RentalRequest) -> bool {
        if let Some(ref client) = self.client
            && &request.client != client
        {
            return false;
        }
        if let Some(ref rental) = self.rental
            && request.rental.as_ref() != Some(rental)
        {
            return false;
        }
        if let Some(equipment) = self.equipment
            && request.equipment != Some(equipment)
        {
            return false;
        }
        true
    }
}
