//! HTTP API server for rental requests.
//!
//! Provides REST endpoints for creating, listing and transitioning rental
//! requests, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use lifecycle::{IdentityResolver, NotificationPublisher, RentalLifecycle};
use metrics_exporter_prometheus::PrometheusHandle;
use rental_store::RentalStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::rentals::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, I, P>(state: Arc<AppState<S, I, P>>, metrics_handle: PrometheusHandle) -> Router
where
    S: RentalStore + 'static,
    I: IdentityResolver + 'static,
    P: NotificationPublisher + 'static,
{
    use routes::rentals;

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/rental_requests",
            get(rentals::list::<S, I, P>).post(rentals::create::<S, I, P>),
        )
        .route("/rental_requests/{id}", get(rentals::get::<S, I, P>))
        .route(
            "/rental_requests/{id}/place_reservation",
            post(rentals::place_reservation::<S, I, P>),
        )
        .route(
            "/rental_requests/{id}/confirm",
            post(rentals::confirm::<S, I, P>),
        )
        .route(
            "/rental_requests/{id}/cancel",
            post(rentals::cancel::<S, I, P>),
        )
        .route(
            "/rental_requests/{id}/activate",
            post(rentals::activate::<S, I, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state from a store and the two notification services.
pub fn create_state<S, I, P>(store: S, identity: I, publisher: P) -> Arc<AppState<S, I, P>>
where
    S: RentalStore,
    I: IdentityResolver,
    P: NotificationPublisher,
{
    Arc::new(AppState {
        lifecycle: RentalLifecycle::new(store, identity, publisher),
    })
}
