use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use controller::api;
use controller::app_state::AppState;
use controller::config::Config;
use controller::fetch::config_source;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

fn load_env_file() {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "Could not determine current directory for .env lookup");
            return;
        }
    };

    let mut current = cwd.clone();
    loop {
        let candidate = current.join(".env");
        if candidate.exists() {
            match dotenvy::from_path(&candidate) {
                Ok(_) => {
                    tracing::info!(path = %candidate.display(), "Loaded environment from .env");
                }
                Err(e) => {
                    tracing::warn!(
                        path = %candidate.display(),
                        error = %e,
                        "Failed to load .env file"
                    );
                }
            }
            return;
        }

        if !current.pop() {
            break;
        }
    }

    tracing::info!(
        cwd = %cwd.display(),
        "No .env file found in current directory or ancestors; using process environment only"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Search ancestors too, so running from `controller/` picks up the
    // workspace `.env`.
    load_env_file();
    let config = Config::from_env()?;

    tracing::info!(
        config_base = %config.config_base,
        trusted_origin = %config.trusted_origin,
        "Starting task player controller"
    );

    let source = config_source(&config.config_base)?;
    let controller_config = source
        .controller_config()
        .await
        .context("Failed to load controller configuration")?;
    tracing::info!(
        players = controller_config.players.len(),
        "Controller configuration loaded"
    );

    let app_state = Arc::new(AppState::new(
        controller_config,
        source,
        config.launch(),
        config.controller_options(),
    ));
    app_state
        .ensure_controller()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn ControllerActor: {e}"))?;

    let allowed_origins = config
        .allowed_origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid CORS origin")?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let api_state = api::ApiState { app_state };
    let app = api::router().with_state(api_state).layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting HTTP server on http://{addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
