use anyhow::{Context, Result};
use async_trait::async_trait;
use delivery_fee_core::WeatherObservation;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::{future::Future, path::Path, str::FromStr, time::Duration};
use time::OffsetDateTime;
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};

use super::ObservationStore;

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Funnels every write through one task so SQLite only ever sees a single writer.
pub struct DatabaseWriter {
    write_tx: mpsc::UnboundedSender<WriteOperation>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for DatabaseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseWriter {
    pub fn new() -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<WriteOperation>();

        let handle = tokio::spawn(async move {
            while let Some(future) = write_rx.recv().await {
                future.await;
            }
        });

        Self {
            write_tx,
            _handle: handle,
        }
    }

    pub async fn execute<T, F, Fut>(&self, pool: SqlitePool, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T>>();

        let write_op = Box::pin(async move {
            let result = operation(pool).await;
            let _ = result_tx.send(result);
        });

        self.write_tx
            .send(write_op)
            .map_err(|_| anyhow::anyhow!("Database writer channel closed"))?;

        result_rx
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive write result"))?
    }
}

pub struct Database {
    pool: SqlitePool,
    writer: DatabaseWriter,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        let db_path = format!("{}/observations.sqlite", path);

        if let Some(parent) = Path::new(&db_path).parent() {
            create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create database directory: {parent:?}"))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };

        db.run_migrations().await?;
        info!("SQLite database initialized at: {}", db_path);

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_observation(row: &SqliteRow) -> Result<WeatherObservation> {
        let observed_at: i64 = row.try_get("observed_at")?;
        Ok(WeatherObservation {
            station: row.try_get("station")?,
            wmo_code: row.try_get("wmo_code")?,
            air_temperature: row.try_get("air_temperature")?,
            wind_speed: row.try_get("wind_speed")?,
            phenomenon: row.try_get("phenomenon")?,
            observed_at: OffsetDateTime::from_unix_timestamp(observed_at)
                .with_context(|| format!("Invalid observed_at timestamp: {observed_at}"))?,
        })
    }
}

#[async_trait]
impl ObservationStore for Database {
    async fn observations_for_station(&self, station: &str) -> Result<Vec<WeatherObservation>> {
        // A single statement reads one consistent snapshot, ordered by insertion
        let rows = sqlx::query(
            "SELECT station, wmo_code, air_temperature, wind_speed, phenomenon, observed_at
             FROM weather_observations
             WHERE station = ?
             ORDER BY id ASC",
        )
        .bind(station)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load observations for {station}"))?;

        rows.iter().map(Self::row_to_observation).collect()
    }

    async fn add_observations(&self, observations: Vec<WeatherObservation>) -> Result<u64> {
        let pool = self.pool.clone();

        self.writer
            .execute(pool, move |pool| async move {
                let mut tx = pool.begin().await?;
                let mut added = 0;

                for observation in observations {
                    sqlx::query(
                        "INSERT INTO weather_observations (
                            station, wmo_code, air_temperature, wind_speed,
                            phenomenon, observed_at
                        ) VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(&observation.station)
                    .bind(&observation.wmo_code)
                    .bind(observation.air_temperature)
                    .bind(observation.wind_speed)
                    .bind(&observation.phenomenon)
                    .bind(observation.observed_at.unix_timestamp())
                    .execute(&mut *tx)
                    .await?;
                    added += 1;
                }

                tx.commit().await?;
                Ok(added)
            })
            .await
    }
}
