//! products service - product catalog over the message transport

use std::sync::Arc;

use catalog_adapter_postgres::MigrationManager;
use catalog_bootstrap::{Infrastructure, run_server};
use catalog_errors::AppError;
use tracing::info;

use products::api::ProductRpcService;
use products::application::ProductService;
use products::infrastructure::persistence::{PostgresProductRepository, migrations};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_server("config", |infra: Arc<Infrastructure>| async move {
        info!("Initializing products service...");

        let pool = infra.postgres_pool();
        if infra.config().database.run_migrations {
            let result = MigrationManager::new(pool.clone()).run(&migrations()).await?;
            info!(
                applied = result.applied_count(),
                skipped = result.skipped.len(),
                "Migrations complete"
            );
        }

        let repo = Arc::new(PostgresProductRepository::new(pool));
        let service = Arc::new(ProductService::new(repo, infra.config().pagination));
        info!("Product service initialized");

        Ok::<_, AppError>(ProductRpcService::new(service))
    })
    .await
}
