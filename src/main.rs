use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use activity_tracker::{
    auth::jwt::JwtKeys,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    routes::{catch_panic_layer, json_error_middleware, router},
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging.rust_log);

    let db_cfg = cfg
        .database
        .as_ref()
        .context("database config is required (APP_DATABASE__URL)")?;
    let auth_cfg = cfg
        .auth
        .clone()
        .context("auth config is required (APP_AUTH__JWT_SECRET, APP_AUTH__ADMIN_PASSWORD)")?;

    let db = connection::connect(db_cfg)
        .await
        .context("failed to connect to database")?;
    let jwt = JwtKeys::from_secret(auth_cfg.jwt_secret.as_bytes());

    let state = AppState::new(cfg, db, jwt);
    state.auth().seed_admin(&auth_cfg).await?;

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
