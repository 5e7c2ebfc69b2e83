//! Rental request CRUD and status transition endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::RentalRequestId;
use domain::{NewRentalRequest, RentalRequest, RentalStatus, Transition};
use lifecycle::{
    IdentityResolver, Notification, NotificationFailure, NotificationPublisher, RentalLifecycle,
    TransitionReport,
};
use rental_store::{RentalQuery, RentalStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, I, P>
where
    S: RentalStore,
    I: IdentityResolver,
    P: NotificationPublisher,
{
    pub lifecycle: RentalLifecycle<S, I, P>,
}

// -- Request types --

/// Query string of the list endpoint. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub client: Option<String>,
    pub rental: Option<String>,
    pub equipment: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<RentalQuery, ApiError> {
        let mut query = RentalQuery::new();

        if let Some(client) = non_empty(self.client) {
            query = query.client(client);
        }
        if let Some(rental) = non_empty(self.rental) {
            query = query.rental(rental);
        }
        if let Some(equipment) = non_empty(self.equipment) {
            let equipment = equipment.trim().parse::<i64>().map_err(|_| {
                ApiError::BadRequest(format!("Invalid equipment filter: {equipment:?}"))
            })?;
            query = query.equipment(equipment);
        }

        Ok(query)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub message: String,
    pub status: RentalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified: Option<bool>,
}

/// Renders a committed transition. A failed notification answers 400 carrying
/// the committed status.
fn transition_response(report: TransitionReport) -> (StatusCode, Json<TransitionResponse>) {
    let status = report.status();

    let (code, message, notified) = match report.notification {
        Notification::NotRequired => (StatusCode::OK, "Reservation placed".to_string(), None),
        Notification::Published { email } => (
            StatusCode::OK,
            format!(
                "{} and event published for {email}",
                past_tense(report.transition)
            ),
            Some(true),
        ),
        Notification::Failed(failure @ NotificationFailure::EmailUnresolved { .. }) => {
            (StatusCode::BAD_REQUEST, failure.to_string(), Some(false))
        }
        Notification::Failed(NotificationFailure::Publish(err)) => (
            StatusCode::BAD_REQUEST,
            format!("Status changed to {status} but event publish failed: {err}"),
            Some(false),
        ),
    };

    (
        code,
        Json(TransitionResponse {
            message,
            status,
            notified,
        }),
    )
}

fn past_tense(transition: Transition) -> &'static str {
    match transition {
        Transition::Place => "Placed",
        Transition::Confirm => "Confirmed",
        Transition::Cancel => "Canceled",
        Transition::Activate => "Activated",
    }
}

// -- Handlers --

/// GET /rental_requests: list requests, optionally filtered.
#[tracing::instrument(skip(state))]
pub async fn list<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RentalRequest>>, ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let query = params.into_query()?;
    let rows = state.lifecycle.list(query).await?;
    Ok(Json(rows))
}

/// POST /rental_requests: create a request in `pending`.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    payload: Result<Json<NewRentalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RentalRequest>), ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state.lifecycle.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /rental_requests/{id}: load one request.
#[tracing::instrument(skip(state))]
pub async fn get<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(id): Path<String>,
) -> Result<Json<RentalRequest>, ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let id = parse_request_id(&id)?;
    let request = state.lifecycle.get(id).await?;
    Ok(Json(request))
}

/// POST /rental_requests/{id}/place_reservation
#[tracing::instrument(skip(state))]
pub async fn place_reservation<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let id = parse_request_id(&id)?;
    Ok(transition_response(state.lifecycle.place(id).await?))
}

/// POST /rental_requests/{id}/confirm
#[tracing::instrument(skip(state))]
pub async fn confirm<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let id = parse_request_id(&id)?;
    Ok(transition_response(state.lifecycle.confirm(id).await?))
}

/// POST /rental_requests/{id}/cancel
#[tracing::instrument(skip(state))]
pub async fn cancel<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let id = parse_request_id(&id)?;
    Ok(transition_response(state.lifecycle.cancel(id).await?))
}

/// POST /rental_requests/{id}/activate
#[tracing::instrument(skip(state))]
pub async fn activate<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError>
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    let id = parse_request_id(&id)?;
    Ok(transition_response(state.lifecycle.activate(id).await?))
}

fn parse_request_id(id: &str) -> Result<RentalRequestId, ApiError> {
    id.parse()
        .map_err(|e: common::ParseRentalRequestIdError| ApiError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_ignore_empty_values() {
        let params = ListParams {
            client: Some(String::new()),
            rental: Some("  ".to_string()),
            equipment: Some(String::new()),
        };
        assert_eq!(params.into_query().unwrap(), RentalQuery::new());
    }

    #[test]
    fn test_list_params_parse_equipment() {
        let params = ListParams {
            client: Some("kc-1".to_string()),
            equipment: Some("12".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.into_query().unwrap(),
            RentalQuery::new().client("kc-1").equipment(12)
        );
    }

    #[test]
    fn test_list_params_reject_non_numeric_equipment() {
        let params = ListParams {
            equipment: Some("drill".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.into_query(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_parse_request_id() {
        assert_eq!(parse_request_id("42").unwrap(), RentalRequestId::new(42));
        assert!(matches!(
            parse_request_id("abc"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
