use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::database::connection::DatabaseManager;
use crate::rental::BlockingPolicy;
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub blocking_policy: BlockingPolicy,
    pub database: DatabaseHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
    pub rental_objects: i64,
    pub pending_bookings: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub blocking_policy: BlockingPolicy,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: Arc<DatabaseManager>, blocking_policy: BlockingPolicy) -> Self {
        let state = AppState {
            db,
            blocking_policy,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .with_state(state);

        Self { router }
    }
}

struct CatalogCounts {
    rental_objects: i64,
    pending_bookings: i64,
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();

    let counts = match catalog_counts(&state.db).await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::warn!("Health check database query failed: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    let response_time_ms = start.elapsed().as_millis() as u64;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        blocking_policy: state.blocking_policy,
        database: DatabaseHealth {
            status: "healthy".to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
            rental_objects: counts.rental_objects,
            pending_bookings: counts.pending_bookings,
        },
        uptime_seconds: uptime,
    }))
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match catalog_counts(&state.db).await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

/// Also fails when migrations have not been applied.
async fn catalog_counts(db: &DatabaseManager) -> Result<CatalogCounts, sqlx::Error> {
    let rental_objects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rental_objects")
        .fetch_one(&db.pool)
        .await?;
    let pending_bookings = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM registration_books WHERE is_confirmed = 0"
    )
    .fetch_one(&db.pool)
    .await?;

    Ok(CatalogCounts {
        rental_objects,
        pending_bookings,
    })
}
