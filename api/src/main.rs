use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};

use tw_api::{app::create_app, routes::AppState};
use tw_core::services::{RoleAuthorizer, SigningKeyProvider, TokenService, TokenServiceConfig};
use tw_infra::{
    cache::{RedisBlacklistStore, RedisClient},
    services::InMemoryCredentialVerifier,
};
use tw_shared::{config::LogFormat, AppConfig, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting TokenWard API server");
    for warning in config.security_warnings() {
        warn!("{}", warning);
    }
    config.validate().context("refusing to start")?;

    let keys = Arc::new(
        SigningKeyProvider::from_config(&config.jwt).context("failed to load signing keys")?,
    );

    let redis = RedisClient::new(config.cache.clone())
        .await
        .context("failed to connect to the revocation store")?;
    let store = RedisBlacklistStore::new(redis);

    let token_config = TokenServiceConfig::from_configs(&config.jwt, &config.cache);
    let token_service = TokenService::new(store, keys, token_config)
        .context("invalid token service configuration")?;

    let authorizer = RoleAuthorizer::from_config(&config.authorization)
        .context("invalid ROLE_IMPLICATIONS")?;

    let credentials =
        InMemoryCredentialVerifier::from_env().context("invalid BOOTSTRAP_USERS")?;

    let app_state = web::Data::new(AppState {
        token_service: Arc::new(token_service),
        credentials: Arc::new(credentials),
        authorizer: Arc::new(authorizer),
    });

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone()).wrap(TracingLogger::default())
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server error")
}

/// Installs the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let _ = match logging.format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).pretty().try_init(),
        LogFormat::Compact => fmt().with_env_filter(filter).compact().try_init(),
    };
}
