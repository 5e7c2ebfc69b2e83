//! External service traits, production clients and in-memory fakes.

pub mod amqp;
pub mod identity;
pub mod keycloak;
pub mod publisher;
pub mod token_cache;

pub use amqp::{AmqpConfig, AmqpPublisher};
pub use identity::{IdentityResolver, InMemoryIdentityResolver};
pub use keycloak::{KeycloakConfig, KeycloakIdentityResolver};
pub use publisher::{InMemoryPublisher, NotificationPublisher};
pub use token_cache::{Clock, InMemoryTokenCache, ManualClock, SystemClock, TokenCache};
