//! Persistence for scored reviews (the `history` table).

use crate::config::DatabaseConfig;
use crate::models::{Rating, ReviewRecord};
use crate::services::metrics::record_db_query;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool, creating the database file if needed.
    ///
    /// An in-memory database only lives as long as its connection, so it is
    /// pinned to a single connection that is never recycled.
    #[instrument(skip(config), fields(service = "sentiment-service"))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");

        info!(
            max_connections = config.max_connections,
            in_memory, "Connecting to SQLite"
        );

        let connect_options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .idle_timeout(Duration::from_secs(600))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Store a scored review and return the new row.
    #[instrument(skip(self, review), fields(rating = %rating, review_len = review.len()))]
    pub async fn create_review(
        &self,
        rating: Rating,
        review: &str,
    ) -> Result<ReviewRecord, AppError> {
        let started = Instant::now();

        let record = sqlx::query_as::<_, ReviewRecord>(
            r#"
            INSERT INTO history (rating, review)
            VALUES (?, ?)
            RETURNING id, rating, review
            "#,
        )
        .bind(i64::from(rating.value()))
        .bind(review)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create review: {}", e)))?;

        record_db_query("create_review", started);

        info!(review_id = record.id, "Review stored");

        Ok(record)
    }

    /// All reviews, oldest first.
    #[instrument(skip(self))]
    pub async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, AppError> {
        let started = Instant::now();

        let records = sqlx::query_as::<_, ReviewRecord>(
            r#"
            SELECT id, rating, review
            FROM history
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list reviews: {}", e)))?;

        record_db_query("list_reviews", started);

        Ok(records)
    }

    /// Delete a review. Returns `false` when no row had that id.
    #[instrument(skip(self))]
    pub async fn delete_review(&self, id: i64) -> Result<bool, AppError> {
        let started = Instant::now();

        let result = sqlx::query("DELETE FROM history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete review: {}", e))
            })?;

        record_db_query("delete_review", started);

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(review_id = id, "Review deleted");
        }

        Ok(deleted)
    }
}
