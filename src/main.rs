use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_core::adapters::{
    InMemoryCartStore, InMemoryOrderRepository, InMemoryProductCatalog, PostgresOrderRepository,
    PostgresProductCatalog, RedisCartStore,
};
use storefront_core::cli::{self, Cli, Commands, DbCommands, OrderCommands};
use storefront_core::config::{Config, LogFormat};
use storefront_core::health::{HealthCheck, MomoCircuitChecker, PostgresChecker, RedisChecker};
use storefront_core::payment::MomoClient;
use storefront_core::{create_app, db, error, AppState, HttpSettings, Repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);
    error::set_expose_internal_details(!config.is_production());

    match cli.command.unwrap_or(Commands::Serve { in_memory: false }) {
        Commands::Serve { in_memory } => serve(config, in_memory).await,
        Commands::Order(OrderCommands::Show { order_id }) => {
            cli::handle_order_show(&config, order_id).await
        }
        Commands::Order(OrderCommands::SetStatus { order_id, status }) => {
            cli::handle_order_set_status(&config, order_id, status).await
        }
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config: Config, in_memory: bool) -> anyhow::Result<()> {
    config.validate()?;

    let (repos, mut health_checks) = if in_memory {
        tracing::warn!("Running with in-memory storage; data is lost on exit");
        let repos = Repositories {
            orders: Arc::new(InMemoryOrderRepository::new()),
            catalog: Arc::new(InMemoryProductCatalog::new()),
            carts: Arc::new(InMemoryCartStore::new(Duration::from_secs(
                config.cart_ttl_secs,
            ))),
        };
        (repos, Vec::new())
    } else {
        let pool = db::create_pool(&config)
            .await
            .context("failed to connect to Postgres")?;
        db::run_migrations(&pool).await?;

        let carts = RedisCartStore::new(&config.redis_url, config.cart_ttl_secs)?;
        let health_checks = vec![
            HealthCheck {
                name: "postgres",
                critical: true,
                checker: Arc::new(PostgresChecker::new(pool.clone())),
            },
            HealthCheck {
                name: "redis",
                critical: false,
                checker: Arc::new(RedisChecker::new(&config.redis_url)?),
            },
        ];
        let repos = Repositories {
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            catalog: Arc::new(PostgresProductCatalog::new(pool)),
            carts: Arc::new(carts),
        };
        (repos, health_checks)
    };

    let momo = MomoClient::new(config.momo.clone());
    tracing::info!(endpoint = %config.momo.endpoint, "MoMo client initialized");
    health_checks.push(HealthCheck {
        name: "momo",
        critical: false,
        checker: Arc::new(MomoCircuitChecker::new(momo.clone())),
    });

    let state = AppState::new(repos, momo, config.bank_account.clone(), health_checks);
    let app = create_app(state, HttpSettings::from_config(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
