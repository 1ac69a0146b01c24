use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::seed::{DEFAULT_FLEET, DEMO_HASH_COST, DEMO_USERS};

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }

    /// Inserts the reference fleet when the airplanes table is empty.
    pub async fn seed_fleet(&self) -> Result<(), sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM airplanes")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (kind, rows, per_row) in DEFAULT_FLEET {
            sqlx::query("INSERT INTO airplanes (type, n_rows, seats_per_row) VALUES ($1, $2, $3)")
                .bind(*kind)
                .bind(*rows)
                .bind(*per_row)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!("Seeded {} airplanes", DEFAULT_FLEET.len());
        Ok(())
    }

    /// Creates the demo accounts if they do not exist yet.
    pub async fn seed_demo_users(&self) -> anyhow::Result<()> {
        for (email, name, password) in DEMO_USERS {
            let hash = bcrypt::hash(*password, DEMO_HASH_COST)?;
            sqlx::query(
                "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3)
                 ON CONFLICT (email) DO NOTHING",
            )
            .bind(*email)
            .bind(*name)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        }
        info!("Demo users ready");
        Ok(())
    }
}
