use std::sync::Arc;

use anyhow::Context;
use catidx_core::{seed_batch, AppConfig, ConfiguredStockScope, DefaultSlugGenerator, ProductId};
use catidx_db::{AttributeData, EavAttributeLoader, Inventory, UrlRewritePathAssigner};
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catidx-cli")]
#[command(about = "Run catalog enrichment against a live database and print the result")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Enrich products with attributes, slugs, ranking counters, and URL paths
    Attributes {
        /// Store view to read attribute values for
        #[arg(long, default_value_t = 0)]
        store: i64,

        /// Product ids to enrich
        #[arg(required = true, num_args = 1..)]
        ids: Vec<ProductId>,
    },
    /// Load inventory documents for products
    Inventory {
        /// Use the child-variant column set
        #[arg(long)]
        children: bool,

        /// Product ids to load
        #[arg(required = true, num_args = 1..)]
        ids: Vec<ProductId>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply the reference catalog schema (development databases only)
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("catidx-cli ready; see --help for commands");
        return Ok(());
    };

    let config = catidx_core::load_app_config().context("loading configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let pool_config = catidx_db::PoolConfig::from_app_config(&config);
    let pool = catidx_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("connecting to the catalog database")?;

    match command {
        Commands::Db { command } => run_db(&pool, command).await?,
        Commands::Attributes { store, ids } => {
            let batch = attribute_data(&pool, &config)
                .enrich(seed_batch(&ids), store)
                .await?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        Commands::Inventory { children, ids } => {
            let inventory = Inventory::new(
                pool.clone(),
                config.inventory_fields.clone(),
                ConfiguredStockScope {
                    website_id: config.stock_website_id,
                },
            );
            let batch = if children {
                inventory.load_children_inventory(&ids).await?
            } else {
                inventory.load_inventory(&ids).await?
            };
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
    }

    Ok(())
}

async fn run_db(pool: &PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            catidx_db::health_check(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = catidx_db::run_migrations(pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

fn attribute_data(pool: &PgPool, config: &AppConfig) -> AttributeData {
    let catalog = &config.catalog;
    AttributeData::new(
        pool.clone(),
        catalog.clone(),
        Arc::new(EavAttributeLoader::new(
            pool.clone(),
            catalog.attribute_codes.clone(),
        )),
        Arc::new(DefaultSlugGenerator),
        Arc::new(UrlRewritePathAssigner::new(
            pool.clone(),
            catalog.product_url_suffix.clone(),
        )),
    )
}

#[cfg(test)]
mod tests;
