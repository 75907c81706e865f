use anyhow::Result;
use catalog::config::CatalogConfig;
use catalog::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "CATALOG_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog=info,tower_http=info")),
        )
        .init();

    let config = match config_path() {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            CatalogConfig::from_yaml_file(&path)?
        }
        None => {
            tracing::info!("No configuration given, using defaults");
            CatalogConfig::default()
        }
    };

    let builder = ServerBuilder::new()
        .with_config(config)
        .with_default_resources();

    #[cfg(feature = "postgres")]
    let builder = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await?;
            catalog::storage::postgres::ensure_schema(&pool).await?;
            tracing::info!("Using PostgreSQL storage");
            builder.with_store(catalog::storage::PostgresRecordStore::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory storage");
            builder
        }
    };

    builder.serve(None).await
}

/// First CLI argument, then the `CATALOG_CONFIG` environment variable
fn config_path() -> Option<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
}
