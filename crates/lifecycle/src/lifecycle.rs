//! Rental lifecycle service.

use std::time::Instant;

use common::RentalRequestId;
use domain::{
    ConflictError, NewRentalRequest, RentalEvent, RentalEventKind, RentalRequest, RentalStatus,
    Transition,
};
use rental_store::{RentalQuery, RentalStore, StatusChange};

use crate::error::{LifecycleError, NotificationFailure, Result};
use crate::services::identity::IdentityResolver;
use crate::services::publisher::NotificationPublisher;

/// What happened to the notification of a committed transition.
#[derive(Debug)]
pub enum Notification {
    /// The transition does not announce itself.
    NotRequired,
    /// The event was accepted by the broker, addressed to `email`.
    Published { email: String },
    /// The status change stands but nobody was told.
    Failed(NotificationFailure),
}

/// Outcome of a transition whose status change was committed.
#[derive(Debug)]
pub struct TransitionReport {
    pub transition: Transition,
    /// The request as persisted after the change.
    pub request: RentalRequest,
    pub notification: Notification,
}

impl TransitionReport {
    /// The status the request now has.
    pub fn status(&self) -> RentalStatus {
        self.request.status
    }

    /// Returns true if the transition wanted a notification and it went out.
    pub fn is_notified(&self) -> bool {
        matches!(self.notification, Notification::Published { .. })
    }
}

/// Drives rental requests through their status transitions.
///
/// Each notifying transition commits the new status first, then resolves the
/// client's email and publishes an event. Notification failures are reported
/// on the [`TransitionReport`] and never undo the status change.
pub struct RentalLifecycle<S, I, P>
where
    S: RentalStore,
    I: IdentityResolver,
    P: NotificationPublisher,
{
    store: S,
    identity: I,
    publisher: P,
}

impl<S, I, P> RentalLifecycle<S, I, P>
where
    S: RentalStore,
    I: IdentityResolver,
    P: NotificationPublisher,
{
    /// Creates a new lifecycle service.
    pub fn new(store: S, identity: I, publisher: P) -> Self {
        Self {
            store,
            identity,
            publisher,
        }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and stores a new request in `pending`.
    #[tracing::instrument(skip(self, request), fields(client = %request.client))]
    pub async fn create(&self, request: NewRentalRequest) -> Result<RentalRequest> {
        let request = request.validate()?;
        let created = self.store.insert(request).await?;

        tracing::info!(request_id = %created.id, "rental request created");
        metrics::counter!("rental_requests_created_total").increment(1);

        Ok(created)
    }

    /// Loads one request.
    pub async fn get(&self, id: RentalRequestId) -> Result<RentalRequest> {
        self.store
            .get(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    /// Lists requests matching every set filter, ordered by id.
    pub async fn list(&self, query: RentalQuery) -> Result<Vec<RentalRequest>> {
        Ok(self.store.list(query).await?)
    }

    /// Moves a confirmed or active request back to `pending`. Never notifies.
    pub async fn place(&self, id: RentalRequestId) -> Result<TransitionReport> {
        self.transition(id, Transition::Place).await
    }

    /// Confirms a pending request and announces it.
    pub async fn confirm(&self, id: RentalRequestId) -> Result<TransitionReport> {
        self.transition(id, Transition::Confirm).await
    }

    /// Cancels a live request and announces it.
    pub async fn cancel(&self, id: RentalRequestId) -> Result<TransitionReport> {
        self.transition(id, Transition::Cancel).await
    }

    /// Activates a pending or confirmed request and announces it.
    pub async fn activate(&self, id: RentalRequestId) -> Result<TransitionReport> {
        self.transition(id, Transition::Activate).await
    }

    /// Applies `transition` to the request `id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the request does not exist
    /// - `Conflict` if the current status does not permit the transition;
    ///   nothing is written and no notification is attempted
    /// - `Store` if the status update itself failed
    #[tracing::instrument(skip(self))]
    pub async fn transition(
        &self,
        id: RentalRequestId,
        transition: Transition,
    ) -> Result<TransitionReport> {
        let started = Instant::now();

        let change = match self.store.apply_transition(id, transition).await {
            Ok(change) => change,
            Err(e) => {
                record_transition(transition, "error", started);
                return Err(e.into());
            }
        };

        let request = match change {
            StatusChange::Applied(request) => request,
            StatusChange::Rejected { current } => {
                tracing::info!(request_id = %id, current = %current, "transition rejected");
                record_transition(transition, "rejected", started);
                return Err(ConflictError::new(transition, current).into());
            }
            StatusChange::NotFound => {
                record_transition(transition, "not_found", started);
                return Err(LifecycleError::NotFound(id));
            }
        };

        tracing::info!(request_id = %id, status = %request.status, "status updated");

        let notification = match transition.event_kind() {
            Some(kind) => self.notify(kind, &request).await,
            None => Notification::NotRequired,
        };

        record_transition(transition, "applied", started);

        Ok(TransitionReport {
            transition,
            request,
            notification,
        })
    }

    async fn notify(&self, kind: RentalEventKind, request: &RentalRequest) -> Notification {
        let Some(email) = self.identity.resolve_email(&request.client).await else {
            tracing::warn!(
                request_id = %request.id,
                client = %request.client,
                "no email for client, event not published"
            );
            record_notification(kind, "email_unresolved");
            return Notification::Failed(NotificationFailure::EmailUnresolved {
                client: request.client.clone(),
            });
        };

        let event = RentalEvent::new(kind, request, email.clone());
        match self.publisher.publish(&event).await {
            Ok(()) => {
                tracing::info!(request_id = %request.id, event = %kind, "event published");
                record_notification(kind, "published");
                Notification::Published { email }
            }
            Err(e) => {
                tracing::warn!(request_id = %request.id, event = %kind, error = %e, "event publish failed");
                record_notification(kind, "publish_failed");
                Notification::Failed(NotificationFailure::Publish(e))
            }
        }
    }
}

fn record_transition(transition: Transition, outcome: &'static str, started: Instant) {
    metrics::counter!(
        "rental_transitions_total",
        "transition" => transition.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "rental_transition_duration_seconds",
        "transition" => transition.as_str()
    )
    .record(started.elapsed().as_secs_f64());
}

fn record_notification(kind: RentalEventKind, outcome: &'static str) {
    metrics::counter!(
        "rental_notifications_total",
        "event" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
