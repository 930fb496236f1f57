//! Snapshot sync job.
//!
//! Extracts supplier/customer/connection projections and the city rollup
//! from the remote warehouse, writes the JSON/CSV exports, and rebuilds the
//! local SQLite snapshot. Run this before starting `atlas_server`, and rerun
//! it whenever the snapshot should be refreshed.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use trade_atlas::sync;
use trade_atlas::{AtlasConfig, WarehouseClient};

#[derive(Parser)]
#[command(name = "atlas_sync", about = "Rebuild the local supply-chain snapshot")]
struct Args {
    /// Warehouse Postgres DSN
    #[arg(long, env = "WAREHOUSE_URL")]
    warehouse_url: Option<String>,

    /// Snapshot database path
    #[arg(long, env = "LOCAL_DB_PATH")]
    db_path: Option<String>,

    /// Directory for the JSON/CSV exports
    #[arg(long, env = "EXPORT_DIR")]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = AtlasConfig::from_env();
    let warehouse_url = args.warehouse_url.unwrap_or(config.warehouse_url);
    let db_path = args.db_path.unwrap_or(config.local_db_path);
    let export_dir = args.export_dir.unwrap_or_else(|| PathBuf::from(config.export_dir));

    println!("{}", "Starting snapshot sync".bold());
    println!("  warehouse: {warehouse_url}");
    println!("  snapshot:  {db_path}");
    println!("  exports:   {}\n", export_dir.display());

    let warehouse = WarehouseClient::connect(&warehouse_url).await?;
    let pool = sync::open_snapshot_for_write(&db_path).await?;

    let summary = sync::run(&warehouse, &pool, &export_dir).await?;

    println!("\n{}", "=== SNAPSHOT SYNC SUMMARY ===".bold());
    println!("Suppliers:      {}", summary.suppliers.to_string().green());
    println!("Customers:      {}", summary.customers.to_string().green());
    println!("Connections:    {}", summary.connections.to_string().green());
    println!("Trade Routes:   {}", summary.trade_routes.to_string().green());
    println!("Map Cities:     {}", summary.map_cities.to_string().green());
    println!("Supplier Revenue: ${:.2}", summary.supplier_revenue);
    println!("Customer Revenue: ${:.2}", summary.customer_revenue);
    println!("Trade Volume:     ${:.2}", summary.trade_volume);
    println!("\n{}", "✓ Snapshot sync complete".green().bold());

    Ok(())
}
