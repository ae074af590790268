use dotenvy::dotenv;
use log::info;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use fieldserver::api_router::configure_api_routes;
use fieldserver::bootstrap::run_schema_migration;
use fieldserver::config::AppConfig;
use fieldserver::shared::state::AppState;
use fieldserver::shared::utils::create_conn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::load()?;

    let pool = create_conn(&config.database.url, config.database.max_connections)?;
    run_schema_migration(&pool)?;

    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(pool, config));

    let app = configure_api_routes()
        .layer(CookieManagerLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
