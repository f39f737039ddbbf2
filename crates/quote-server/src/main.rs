use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use quote_api::{AppStateInner, auth::seed_default_admin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_engine=debug,quote_api=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("QUOTE_DB_PATH").unwrap_or_else(|_| "quotes.db".into());
    let host = std::env::var("QUOTE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("QUOTE_PORT")
        .unwrap_or_else(|_| "2019".into())
        .parse()?;
    let origin =
        std::env::var("QUOTE_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());

    // Init database
    let db = quote_db::Database::open(&PathBuf::from(&db_path))?;
    seed_default_admin(&db)?;

    // Routes
    let origin: HeaderValue = origin.parse()?;
    let state = AppStateInner::new(db);
    let app = quote_api::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin([origin])
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Quote Engine listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
