//! PostgreSQL migration management
//!
//! Versioned, checksummed migrations recorded in a bookkeeping table.

use std::collections::HashMap;

use catalog_errors::{AppError, AppResult};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{info, warn};

/// Applied migration record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// Migration definition
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub checksum: String,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        let up_sql = up_sql.into();
        let checksum = Self::calculate_checksum(&up_sql);
        Self {
            version,
            name: name.into(),
            up_sql,
            checksum,
        }
    }

    fn calculate_checksum(sql: &str) -> String {
        hex::encode(Sha256::digest(sql.as_bytes()))
    }
}

/// What [`MigrationManager::run`] would do against a set of applied records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Versions to apply, ascending
    pub pending: Vec<i64>,
    /// Versions already applied with a matching checksum
    pub skipped: Vec<i64>,
    /// Versions whose stored checksum differs from the definition
    pub modified: Vec<i64>,
}

impl MigrationPlan {
    pub fn build(applied: &[MigrationRecord], migrations: &[Migration]) -> Self {
        let applied: HashMap<i64, &str> = applied
            .iter()
            .map(|r| (r.version, r.checksum.as_str()))
            .collect();

        let mut sorted: Vec<&Migration> = migrations.iter().collect();
        sorted.sort_by_key(|m| m.version);

        let mut plan = Self::default();
        for migration in sorted {
            match applied.get(&migration.version) {
                Some(checksum) if *checksum == migration.checksum => {
                    plan.skipped.push(migration.version)
                }
                Some(_) => plan.modified.push(migration.version),
                None => plan.pending.push(migration.version),
            }
        }
        plan
    }
}

/// Migration run result
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    pub applied: Vec<i64>,
    pub skipped: Vec<i64>,
}

impl MigrationResult {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// Migration manager
pub struct MigrationManager {
    pool: PgPool,
    table_name: String,
}

impl MigrationManager {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_name: "_migrations".to_string(),
        }
    }

    /// Create the bookkeeping table
    pub async fn init(&self) -> AppResult<()> {
        let create_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                checksum VARCHAR(64) NOT NULL
            )
            "#,
            self.table_name
        );

        sqlx::query(&create_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create migration table: {}", e)))?;

        Ok(())
    }

    pub async fn applied_migrations(&self) -> AppResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT version, name, applied_at, checksum FROM {} ORDER BY version ASC",
            self.table_name
        );

        sqlx::query_as::<_, MigrationRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get migrations: {}", e)))
    }

    /// Apply one migration inside a transaction
    pub async fn apply(&self, migration: &Migration) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::raw_sql(&migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to apply migration {}: {}",
                    migration.version, e
                ))
            })?;

        let insert_sql = format!(
            "INSERT INTO {} (version, name, checksum) VALUES ($1, $2, $3)",
            self.table_name
        );
        sqlx::query(&insert_sql)
            .bind(migration.version)
            .bind(&migration.name)
            .bind(&migration.checksum)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to record migration: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit migration: {}", e)))?;

        info!(
            version = migration.version,
            name = %migration.name,
            "Migration applied"
        );

        Ok(())
    }

    /// Apply every pending migration in version order
    ///
    /// A migration that was edited after being applied aborts the run.
    pub async fn run(&self, migrations: &[Migration]) -> AppResult<MigrationResult> {
        self.init().await?;

        let applied = self.applied_migrations().await?;
        let plan = MigrationPlan::build(&applied, migrations);

        if let Some(version) = plan.modified.first() {
            warn!(version, "Applied migration has been modified");
            return Err(AppError::internal(format!(
                "Checksum mismatch for migration {}",
                version
            )));
        }

        let mut result = MigrationResult {
            applied: Vec::new(),
            skipped: plan.skipped,
        };

        for version in plan.pending {
            if let Some(migration) = migrations.iter().find(|m| m.version == version) {
                self.apply(migration).await?;
                result.applied.push(version);
            }
        }

        Ok(result)
    }
}
