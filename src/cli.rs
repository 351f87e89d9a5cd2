use clap::{Parser, Subcommand};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::PostgresOrderRepository;
use crate::config::{mask_password, mask_secret, Config};
use crate::domain::OrderStatus;
use crate::use_cases::OrderManager;

#[derive(Parser)]
#[command(name = "storefront-core")]
#[command(about = "Storefront Core - orders, carts and MoMo/bank-transfer payments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Keep orders, products and carts in process memory instead of Postgres/Redis
        #[arg(long)]
        in_memory: bool,
    },

    /// Order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Print one order as JSON
    Show {
        #[arg(value_name = "ORDER_ID")]
        order_id: Uuid,
    },

    /// Apply an admin status transition
    SetStatus {
        #[arg(value_name = "ORDER_ID")]
        order_id: Uuid,

        /// pending, processing, paid, failed, shipped, delivered or cancelled
        #[arg(value_name = "STATUS", value_parser = parse_status)]
        status: OrderStatus,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

fn parse_status(raw: &str) -> Result<OrderStatus, String> {
    raw.trim().to_lowercase().parse()
}

async fn order_manager(config: &Config) -> anyhow::Result<OrderManager> {
    let pool = crate::db::create_pool(config).await?;
    Ok(OrderManager::new(Arc::new(PostgresOrderRepository::new(pool))))
}

pub async fn handle_order_show(config: &Config, order_id: Uuid) -> anyhow::Result<()> {
    let order = order_manager(config)
        .await?
        .get(order_id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", serde_json::to_string_pretty(&order)?);
    Ok(())
}

pub async fn handle_order_set_status(
    config: &Config,
    order_id: Uuid,
    status: OrderStatus,
) -> anyhow::Result<()> {
    let order = order_manager(config)
        .await?
        .admin_transition(order_id, status)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!(order_id = %order.id, status = %order.status, "Order status set from CLI");
    println!("✓ Order {} is now {}", order.id, order.status);
    Ok(())
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");
    config.validate()?;

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Environment: {}", config.app_env);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Redis URL: {}", mask_password(&config.redis_url));
    println!("  Admin API Key: {}", mask_secret(&config.admin_api_key));
    println!("  Cart TTL: {}s", config.cart_ttl_secs);
    println!("  MoMo Endpoint: {}", config.momo.endpoint);
    println!("  MoMo Partner Code: {}", config.momo.partner_code);
    println!("  MoMo Access Key: {}", mask_secret(&config.momo.access_key));
    println!("  MoMo Secret Key: {}", mask_secret(&config.momo.secret_key));
    println!("  MoMo IPN URL: {}", config.momo.ipn_url);
    println!("  MoMo IPN Allowed IPs: {:?}", config.momo_ipn_allowed_ips);
    println!("  Bank Account: {}", mask_secret(&config.bank_account.account_number));

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");
    Ok(())
}
