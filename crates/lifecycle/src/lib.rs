//! Rental request lifecycle.
//!
//! This crate drives the four status transitions of a rental request
//! (place, confirm, cancel, activate). Each transition:
//! 1. Applies a guarded status update in the store
//! 2. Resolves the owning client's email through the identity provider
//! 3. Publishes a durable event to the notification queue
//!
//! Steps 2 and 3 are best effort: the status written in step 1 is never
//! rolled back, and a failed notification is reported alongside it.

pub mod error;
pub mod lifecycle;
pub mod services;

pub use error::{IdentityError, LifecycleError, NotificationFailure, PublishError};
pub use lifecycle::{Notification, RentalLifecycle, TransitionReport};
pub use services::{
    AmqpConfig, AmqpPublisher, Clock, IdentityResolver, InMemoryIdentityResolver,
    InMemoryPublisher, InMemoryTokenCache, KeycloakConfig, KeycloakIdentityResolver, ManualClock,
    NotificationPublisher, SystemClock, TokenCache,
};
