use tokio::net::TcpListener;
use vulnshop::{app_router, connect, ensure_schema, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vulnshop=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    if config.production && !config.has_custom_secret() {
        tracing::warn!("APP_ENV is production but SECRET_KEY is the built-in default");
    }
    let db = connect(&config).await?;
    ensure_schema(&db).await?;

    let addr = config.bind_addr();
    let app = app_router(AppState::new(db.clone(), config));
    let listener = TcpListener::bind(&addr).await?;
    let port = listener.local_addr()?.port();
    tracing::info!(backend = db.kind().as_str(), "VulnShop listening on http://{}", addr);
    tracing::warn!(port, "this application is intentionally vulnerable; do not expose it");
    axum::serve(listener, app).await?;
    Ok(())
}
