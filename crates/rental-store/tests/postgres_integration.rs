//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p rental-store --test postgres_integration -- --test-threads=1
//! ```

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use domain::{NewRentalRequest, RentalStatus, Transition};
use rental_store::{
    PostgresRentalStore, RentalQuery, RentalRequestId, RentalStore, StatusChange, StoreError,
};
use rust_decimal::Decimal;
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_rental_requests.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and an emptied table
async fn get_test_store() -> PostgresRentalStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE rental_requests RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresRentalStore::new(pool)
}

fn new_request(client: &str) -> NewRentalRequest {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    NewRentalRequest::new(client, start, start + Duration::days(7))
}

#[tokio::test]
#[serial]
async fn insert_and_get_round_trip_all_columns() {
    let store = get_test_store().await;

    let created = store
        .insert(
            new_request("kc-user-1")
                .with_equipment(17)
                .with_rental("R-2025-001")
                .with_quantity(3)
                .with_total_price(Decimal::from_str("450.50").unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(created.status, RentalStatus::Pending);

    let loaded = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.equipment, Some(17));
    assert_eq!(loaded.rental.as_deref(), Some("R-2025-001"));
    assert_eq!(loaded.total_price, Some(Decimal::from_str("450.50").unwrap()));
}

#[tokio::test]
#[serial]
async fn get_unknown_id_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(RentalRequestId::new(404)).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn transition_applies_when_guard_holds() {
    let store = get_test_store().await;
    let created = store.insert(new_request("kc-user-1")).await.unwrap();

    let change = store
        .apply_transition(created.id, Transition::Confirm)
        .await
        .unwrap();
    assert!(matches!(change, StatusChange::Applied(ref r) if r.status == RentalStatus::Confirmed));

    let loaded = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, RentalStatus::Confirmed);
}

#[tokio::test]
#[serial]
async fn transition_rejected_reports_persisted_status() {
    let store = get_test_store().await;
    let created = store.insert(new_request("kc-user-1")).await.unwrap();

    store
        .apply_transition(created.id, Transition::Cancel)
        .await
        .unwrap();

    for transition in Transition::ALL {
        let change = store
            .apply_transition(created.id, transition)
            .await
            .unwrap();
        assert_eq!(
            change,
            StatusChange::Rejected {
                current: RentalStatus::Canceled
            }
        );
    }

    let loaded = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, RentalStatus::Canceled);
}

#[tokio::test]
#[serial]
async fn transition_on_unknown_id_is_not_found() {
    let store = get_test_store().await;
    let change = store
        .apply_transition(RentalRequestId::new(12345), Transition::Activate)
        .await
        .unwrap();
    assert_eq!(change, StatusChange::NotFound);
}

#[tokio::test]
#[serial]
async fn concurrent_confirms_apply_exactly_once() {
    let store = get_test_store().await;
    let id = store.insert(new_request("kc-user-1")).await.unwrap().id;

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.apply_transition(id, Transition::Confirm).await })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        if let StatusChange::Applied(_) = handle.await.unwrap().unwrap() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
}

#[tokio::test]
#[serial]
async fn racing_transitions_report_a_status_their_guard_rejects() {
    let store = get_test_store().await;

    for _ in 0..10 {
        let id = store.insert(new_request("kc-user-1")).await.unwrap().id;

        let handles: Vec<_> = [Transition::Confirm, Transition::Activate, Transition::Cancel]
            .into_iter()
            .map(|transition| {
                let store = store.clone();
                tokio::spawn(async move {
                    let change = store.apply_transition(id, transition).await;
                    (transition, change)
                })
            })
            .collect();

        for handle in handles {
            let (transition, change) = handle.await.unwrap();
            if let StatusChange::Rejected { current } = change.unwrap() {
                assert!(
                    !transition.permits(current),
                    "{transition} rejected while {current}"
                );
            }
        }
    }
}

#[tokio::test]
#[serial]
async fn list_filters_combine_as_intersection() {
    let store = get_test_store().await;

    store
        .insert(new_request("client-a").with_equipment(1))
        .await
        .unwrap();
    store
        .insert(new_request("client-a").with_equipment(2))
        .await
        .unwrap();
    store
        .insert(new_request("client-b").with_equipment(1))
        .await
        .unwrap();

    let all = store.list(RentalQuery::new()).await.unwrap();
    assert_eq!(all.len(), 3);

    let by_client = store.list(RentalQuery::new().client("client-a")).await.unwrap();
    assert_eq!(by_client.len(), 2);
    assert!(by_client.iter().all(|r| r.client.as_str() == "client-a"));

    let both = store
        .list(RentalQuery::new().client("client-a").equipment(1))
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].equipment, Some(1));
}

#[tokio::test]
#[serial]
async fn list_filters_by_rental_reference() {
    let store = get_test_store().await;

    store
        .insert(new_request("client-a").with_rental("R-1"))
        .await
        .unwrap();
    store.insert(new_request("client-a")).await.unwrap();

    let rows = store.list(RentalQuery::new().rental("R-1")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rental.as_deref(), Some("R-1"));
}

#[tokio::test]
#[serial]
async fn database_rejects_unknown_status_values() {
    let store = get_test_store().await;
    let created = store.insert(new_request("kc-user-1")).await.unwrap();

    let result = sqlx::query("UPDATE rental_requests SET status = 'archived' WHERE id = $1")
        .bind(created.id.as_i64())
        .execute(store.pool())
        .await;

    assert!(result.is_err());
    let err = StoreError::from(result.unwrap_err());
    assert!(matches!(err, StoreError::Database(_)));
}
