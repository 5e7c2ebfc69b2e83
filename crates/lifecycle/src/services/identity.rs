//! Identity resolver trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ClientId;

/// Trait for looking up a client's contact email.
///
/// Implementations never fail: a missing user, an unreachable provider or a
/// bad token all yield `None`. Callers treat `None` as "notification cannot
/// be addressed".
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the email of the given client, if it can be resolved.
    async fn resolve_email(&self, client: &ClientId) -> Option<String>;
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    emails: HashMap<ClientId, String>,
    lookups: usize,
}

/// In-memory identity resolver for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityResolver {
    state: Arc<RwLock<InMemoryIdentityState>>,
}

impl InMemoryIdentityResolver {
    /// Creates a resolver that knows no clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the email returned for `client`.
    pub fn insert(&self, client: impl Into<ClientId>, email: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .emails
            .insert(client.into(), email.into());
    }

    /// Forgets the email of `client`.
    pub fn remove(&self, client: &ClientId) {
        self.state.write().unwrap().emails.remove(client);
    }

    /// Returns the number of lookups performed so far.
    pub fn lookup_count(&self) -> usize {
        self.state.read().unwrap().lookups
    }
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityResolver {
    async fn resolve_email(&self, client: &ClientId) -> Option<String> {
        let mut state = self.state.write().unwrap();
        state.lookups += 1;
        state.emails.get(client).cloned()
    }
}
