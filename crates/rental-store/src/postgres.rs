use std::time::Instant;

use async_trait::async_trait;
use domain::{NewRentalRequest, RentalRequest, RentalStatus, Transition};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    ClientId, RentalQuery, RentalRequestId, Result,
    store::{RentalStore, StatusChange},
};

const COLUMNS: &str =
    "id, equipment, rental, client, start_date, end_date, quantity, total_price, status";

const RETURNING_COLUMNS: &str = "rental_requests.id, rental_requests.equipment, \
    rental_requests.rental, rental_requests.client, rental_requests.start_date, \
    rental_requests.end_date, rental_requests.quantity, rental_requests.total_price, \
    rental_requests.status";

/// PostgreSQL-backed rental store implementation.
#[derive(Clone)]
pub struct PostgresRentalStore {
    pool: PgPool,
}

impl PostgresRentalStore {
    /// Creates a new PostgreSQL rental store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn record_query(operation: &'static str, started: Instant) {
        metrics::histogram!(
            "rental_store_query_duration_seconds",
            "operation" => operation
        )
        .record(started.elapsed().as_secs_f64());
    }

    fn row_to_request(row: PgRow) -> Result<RentalRequest> {
        let status: String = row.try_get("status")?;

        Ok(RentalRequest {
            id: RentalRequestId::new(row.try_get("id")?),
            equipment: row.try_get("equipment")?,
            rental: row.try_get("rental")?,
            client: ClientId::new(row.try_get::<String, _>("client")?),
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            quantity: row.try_get("quantity")?,
            total_price: row.try_get("total_price")?,
            status: status.parse()?,
        })
    }
}

#[async_trait]
impl RentalStore for PostgresRentalStore {
    async fn insert(&self, request: NewRentalRequest) -> Result<RentalRequest> {
        let started = Instant::now();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO rental_requests (equipment, rental, client, start_date, end_date, quantity, total_price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(request.equipment)
        .bind(&request.rental)
        .bind(request.client.as_str())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.quantity)
        .bind(request.total_price)
        .bind(RentalStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;
        Self::record_query("insert", started);

        let created = Self::row_to_request(row)?;
        tracing::debug!(request_id = %created.id, "rental request inserted");
        Ok(created)
    }

    async fn get(&self, id: RentalRequestId) -> Result<Option<RentalRequest>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM rental_requests WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_request).transpose()
    }

    async fn list(&self, query: RentalQuery) -> Result<Vec<RentalRequest>> {
        let started = Instant::now();
        let mut sql = format!("SELECT {COLUMNS} FROM rental_requests WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.client.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND client = ${param_count}"));
        }
        if query.rental.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND rental = ${param_count}"));
        }
        if query.equipment.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND equipment = ${param_count}"));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(client) = query.client {
            sqlx_query = sqlx_query.bind(client.as_str().to_string());
        }
        if let Some(rental) = query.rental {
            sqlx_query = sqlx_query.bind(rental);
        }
        if let Some(equipment) = query.equipment {
            sqlx_query = sqlx_query.bind(equipment);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        Self::record_query("list", started);
        rows.into_iter().map(Self::row_to_request).collect()
    }

    async fn apply_transition(
        &self,
        id: RentalRequestId,
        transition: Transition,
    ) -> Result<StatusChange> {
        let started = Instant::now();
        let allowed: Vec<String> = transition
            .allowed_from()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        // Lock the row, guard and write in one statement so a rejection
        // reports the status the guard actually saw.
        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            WITH prior AS (
                SELECT id, status FROM rental_requests WHERE id = $1 FOR UPDATE
            ),
            updated AS (
                UPDATE rental_requests
                SET status = $2
                FROM prior
                WHERE rental_requests.id = prior.id AND prior.status = ANY($3)
                RETURNING {RETURNING_COLUMNS}
            )
            SELECT prior.status AS prior_status, updated.*
            FROM prior LEFT JOIN updated ON TRUE
            "#
        ))
        .bind(id.as_i64())
        .bind(transition.target().as_str())
        .bind(&allowed)
        .fetch_optional(&self.pool)
        .await?;

        Self::record_query("transition", started);

        let Some(row) = row else {
            return Ok(StatusChange::NotFound);
        };

        let applied: Option<i64> = row.try_get("id")?;
        if applied.is_some() {
            return Ok(StatusChange::Applied(Self::row_to_request(row)?));
        }

        let current: RentalStatus = row.try_get::<String, _>("prior_status")?.parse()?;
        tracing::debug!(request_id = %id, %transition, %current, "guard rejected transition");
        Ok(StatusChange::Rejected { current })
    }
}
