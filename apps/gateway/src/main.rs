use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio_gateway::backend::SupabaseBackend;
use portfolio_gateway::config::Config;
use portfolio_gateway::gateway::ProfileGateway;
use portfolio_gateway::routes::build_router;
use portfolio_gateway::session::FileSessionStore;
use portfolio_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio gateway v{}", env!("CARGO_PKG_VERSION"));

    let backend = SupabaseBackend::new(&config.supabase_url, config.supabase_anon_key.clone())?;
    info!("Backend client initialized ({})", config.supabase_url);

    let sessions = FileSessionStore::new(config.session_file.clone());
    info!("Session cache at {}", config.session_file.display());

    let options = config.gateway_options();
    if !options.enforce_ownership {
        info!("Ownership checks on update/delete are disabled");
    }

    let gateway = ProfileGateway::new(Arc::new(backend), Arc::new(sessions), options);
    let state = AppState {
        gateway: Arc::new(gateway),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the UI is served from another local origin

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
