//! Lifecycle error types.

use common::{ClientId, RentalRequestId};
use domain::{ConflictError, ValidationError};
use rental_store::StoreError;
use thiserror::Error;

/// Errors that abort a lifecycle operation.
///
/// Notification problems are not in here: they are reported on
/// [`crate::TransitionReport`] because the status change has already been
/// committed by then.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No rental request with this id.
    #[error("Rental request not found: {0}")]
    NotFound(RentalRequestId),

    /// The transition guard failed; nothing was written.
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// The creation payload is invalid.
    #[error("Invalid rental request: {0}")]
    Invalid(#[from] ValidationError),

    /// The store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Why a committed transition could not be announced.
#[derive(Debug, Error)]
pub enum NotificationFailure {
    /// The identity provider gave no email for the client.
    #[error("Could not fetch email for client {client}")]
    EmailUnresolved { client: ClientId },

    /// The broker did not accept the event.
    #[error("Event publish failed: {0}")]
    Publish(#[from] PublishError),
}

/// Errors talking to the identity provider.
///
/// These never escape the resolver's public lookup; they are logged and the
/// lookup yields no email.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token exchange returned a non-success status.
    #[error("Token exchange failed (status {status}): {body}")]
    AuthProvider { status: u16, body: String },

    /// The user-detail endpoint returned something other than 200.
    #[error("User lookup failed (status {status}): {body}")]
    UserLookup { status: u16, body: String },

    /// The user record has no string `email` field.
    #[error("User record has no email")]
    MissingEmail,

    /// A response body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A configured endpoint is not a usable URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport failure or timeout.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors publishing to the message broker.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Could not open a connection to the broker.
    #[error("Broker connection failed: {0}")]
    Connect(#[source] lapin::Error),

    /// Channel, queue declaration or publish failed.
    #[error("Broker channel error: {0}")]
    Channel(#[source] lapin::Error),

    /// The broker did not answer in time.
    #[error("Broker {0} timed out")]
    Timeout(&'static str),

    /// The broker refused the message.
    #[error("Broker rejected the message")]
    Nacked,

    /// The channel returned no publisher confirmation.
    #[error("Broker did not confirm the message")]
    Unconfirmed,

    /// The event could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker is unavailable.
    #[error("Broker unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for lifecycle results.
pub type Result<T> = std::result::Result<T, LifecycleError>;
