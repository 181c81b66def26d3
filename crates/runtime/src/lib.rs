use anyhow::{Context, Result};
use relay_config::AppConfig;
use relay_database::{initialize_database, MemberRepository, MessageRepository, UserRepository};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global fmt subscriber. `RUST_LOG` overrides the default
    /// `info` filter.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Stores backing the relay, all sharing one pool.
#[derive(Clone)]
pub struct RelayServices {
    pub db_pool: SqlitePool,
    pub users: UserRepository,
    pub members: MemberRepository,
    pub messages: MessageRepository,
}

impl RelayServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        info!(url = %config.database.url, "relay stores ready");

        Ok(Self {
            users: UserRepository::new(db_pool.clone()),
            members: MemberRepository::new(db_pool.clone()),
            messages: MessageRepository::new(db_pool.clone()),
            db_pool,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
