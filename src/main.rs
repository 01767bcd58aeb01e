use chronicle::{api, AppState, Config, JournalStore};
use clap::Parser;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Chronicle - a personal journal API
#[derive(Parser, Debug)]
#[command(
    name = "chronicle-server",
    version,
    about = "Chronicle - a personal journal API with anonymous and registered authoring",
    after_help = "EXAMPLES:\n    \
                  TOKEN_SECRET=... chronicle-server                 # defaults: 127.0.0.1:8081, chronicle.db\n    \
                  chronicle-server --port 9000 --db /var/lib/chronicle.db"
)]
struct Cli {
    /// Host address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Path to the database file (overrides CHRONICLE_DB)
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronicle=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let store = Arc::new(JournalStore::new_local(&config.database.path).await?);
    tracing::info!(path = %config.database.path, "database ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config), store);

    let app = api::routes::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(RequestBodyLimitLayer::new(1024 * 1024));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Chronicle has started");
    axum::serve(listener, app).await?;

    Ok(())
}
