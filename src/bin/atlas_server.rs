//! Trade Atlas REST API server.
//!
//! Serves the local SQLite snapshot produced by `atlas_sync`, plus the
//! warehouse-backed customer routes and the LLM insight routes when their
//! backends are configured.
//!
//! ## Usage
//!
//! ```bash
//! # Build the snapshot first
//! cargo run --bin atlas_sync
//!
//! # Then start the server
//! cargo run --bin atlas_server
//!
//! curl http://localhost:3000/api/locations?type=supplier
//! curl http://localhost:3000/api/stats
//! curl http://localhost:3000/api/health
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use trade_atlas::ai::{InsightClient, InsightConfig};
use trade_atlas::api::{create_api_router, AppState};
use trade_atlas::{AtlasConfig, LocalStore, WarehouseClient};

#[derive(Parser)]
#[command(name = "atlas_server", about = "Supply-chain snapshot API server")]
struct Args {
    /// Port to listen on (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Snapshot database path (overrides LOCAL_DB_PATH)
    #[arg(long)]
    db_path: Option<String>,
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
    let mut config = AtlasConfig::from_env();
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(db_path) = args.db_path {
        config.local_db_path = db_path;
    }

    println!("🚀 Starting Trade Atlas API Server");
    println!("📊 Opening snapshot: {}", config.local_db_path);

    let local = LocalStore::open(&config.local_db_path).await?;
    let mut state = AppState::new(local);

    match WarehouseClient::connect(&config.warehouse_url).await {
        Ok(warehouse) => {
            println!("✅ Warehouse connection established");
            state = state.with_warehouse(warehouse);
        }
        Err(e) => {
            tracing::warn!("Warehouse unavailable, customer routes will serve snapshot data: {e:#}");
            println!("⚠️  Warehouse unavailable, customer routes degrade to snapshot data");
        }
    }

    if let Some(api_key) = &config.anthropic_api_key {
        let insight = InsightClient::new(InsightConfig::new(
            api_key.clone(),
            config.anthropic_model.clone(),
        ))?;
        state = state.with_llm(Arc::new(insight));
        println!("✅ LLM routes enabled ({})", config.anthropic_model);
    } else {
        println!("⚠️  ANTHROPIC_API_KEY not set, LLM routes return 503");
    }

    let app = create_api_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    println!("\n🌐 Server running on http://{}", addr);
    println!("\n📖 Available endpoints:");
    println!("  GET  /api/locations             - All locations (suppliers + customers)");
    println!("  GET  /api/locations?type=supplier - Suppliers only");
    println!("  GET  /api/locations/:id         - Single location with connections");
    println!("  GET  /api/connections           - Supplier→customer connections");
    println!("  GET  /api/connections?type=state_to_state - Trade routes");
    println!("  GET  /api/stats                 - Overall statistics");
    println!("  GET  /api/supplier-exclusivity  - Supplier concentration per customer");
    println!("  GET  /api/map/cities            - City rollup for the map");
    println!("  GET  /api/customers/:id/orders  - Warehouse order history");
    println!("  POST /api/llm/parse-query       - Natural-language filter parsing");
    println!("  GET  /api/health                - Health check");
    println!("\n✨ Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
