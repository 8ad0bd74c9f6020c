//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{HealthsimConfig, LogFormat};
use crate::health::HealthState;
use crate::metadata::ResolverChain;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<HealthsimConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        HealthsimConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        HealthsimConfig::default()
    };

    config = config.with_env_overrides();

    // CLI flags win
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(ref region) = args.region {
        config.metadata.region = Some(region.clone());
    }
    if let Some(seed) = args.seed {
        config.health.rng_seed = Some(seed);
    }
    if args.no_metadata_server {
        config.metadata.metadata_enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Build the shared state and router for a loaded configuration
pub fn build_app(
    config: HealthsimConfig,
) -> Result<(axum::Router, Arc<AppState>), Box<dyn std::error::Error>> {
    let health = Arc::new(HealthState::from_config(&config.health));
    let metadata = Arc::new(ResolverChain::from_config(&config.metadata)?);

    tracing::info!(
        healthy = config.health.initial_healthy,
        readiness_percent = config.health.initial_readiness_percent,
        seeded = config.health.rng_seed.is_some(),
        sources = ?metadata.source_names(),
        "Health state initialized"
    );

    let app_state = Arc::new(AppState::new(health, metadata, Arc::new(config)));
    let router = create_router(Arc::clone(&app_state));
    Ok((router, app_state))
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Serve `app` on `listener` until `cancel_token` fires or a signal arrives
pub async fn serve_until_cancelled(
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting healthsim server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Build state and router
    let addr = config.server.bind_addr();
    let (app, _app_state) = build_app(config)?;

    // 4. Bind and serve
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(addr = %addr, error = %e, "Failed to bind listener");
        format!("failed to bind {}: {}", addr, e)
    })?;
    tracing::info!(addr = %addr, "healthsim listening");

    serve_until_cancelled(listener, app, CancellationToken::new()).await?;

    tracing::info!("healthsim server stopped");
    Ok(())
}
