use portfolio_ledger::{api, config::Config, ChainSource, Dashboard, RpcChainSource};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let source: Arc<dyn ChainSource> = Arc::new(RpcChainSource::new(config.rpc_url.clone()));
    let dashboard = Arc::new(Dashboard::new(source, &config));

    tracing::info!(
        contract = %config.portfolio_manager,
        from_block = %config.deployment_block,
        policy = ?config.redemption_policy,
        "Portfolio ledger configured"
    );

    // Create router
    let app = api::create_router(api::AppState::new(config, dashboard));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
