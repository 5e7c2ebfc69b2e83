//! Notification publisher trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::RentalEvent;

use crate::error::PublishError;

/// Trait for delivering rental events to the notification queue.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publishes one event. Success means the broker acknowledged it.
    async fn publish(&self, event: &RentalEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    published: Vec<RentalEvent>,
    fail_on_publish: bool,
}

/// In-memory publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject every publish call.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns every event accepted so far, oldest first.
    pub fn published(&self) -> Vec<RentalEvent> {
        self.state.read().unwrap().published.clone()
    }

    /// Returns the number of events accepted so far.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }
}

#[async_trait]
impl NotificationPublisher for InMemoryPublisher {
    async fn publish(&self, event: &RentalEvent) -> Result<(), PublishError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(PublishError::Unavailable("broker rejected event".to_string()));
        }

        state.published.push(event.clone());
        Ok(())
    }
}
