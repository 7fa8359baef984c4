use actix_cors::Cors;
use actix_middleware::{CorrelationIdMiddleware, MetricsMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use jwt_security::{
    InMemoryRevocationLedger, RedisRevocationLedger, RevocationLedger, TokenCodec,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use video_service::config::{Config, CorsConfig, RevocationBackend, StorageBackend};
use video_service::db::{create_pool, run_migrations, PgRevocationLedger};
use video_service::jobs::RevocationPurgeJob;
use video_service::{routes, AppState};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();
    for origin in config.origins() {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(&origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}

async fn redis_ledger(url: &str) -> anyhow::Result<Arc<dyn RevocationLedger>> {
    let client = redis::Client::open(url).context("invalid REDIS_URL")?;
    let manager = redis::aio::ConnectionManager::new(client)
        .await
        .context("failed to connect to Redis")?;
    tracing::info!("revocation ledger: redis");
    Ok(Arc::new(RedisRevocationLedger::new(manager)))
}

async fn build_state(config: &Config, codec: Arc<TokenCodec>) -> anyhow::Result<AppState> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("storage backend: memory (data is lost on restart)");
            Ok(AppState::in_memory_with_ledger(
                codec,
                Arc::new(InMemoryRevocationLedger::new()),
            ))
        }
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database)
                .await
                .context("failed to create PostgreSQL pool")?;

            if config.database.run_migrations {
                run_migrations(&pool)
                    .await
                    .context("failed to run database migrations")?;
                tracing::info!("database migrations applied");
            }

            let ledger: Arc<dyn RevocationLedger> = match config.storage.revocation_backend {
                RevocationBackend::Postgres => {
                    tracing::info!("revocation ledger: postgres");
                    Arc::new(PgRevocationLedger::new(pool.clone()))
                }
                RevocationBackend::Redis => redis_ledger(&config.storage.redis_url).await?,
            };

            Ok(AppState::postgres(pool, codec, ledger))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(config.app.log_json);

    tracing::info!("Starting video-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let codec = TokenCodec::from_configured_secret(
        config.auth.jwt_secret.clone(),
        chrono::Duration::hours(config.auth.token_ttl_hours),
        config.app.is_production(),
    )
    .context("failed to initialise token codec")?;

    let state = build_state(&config, Arc::new(codec)).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    let purge_handle = RevocationPurgeJob::new(
        state.ledger.clone(),
        Duration::from_secs(config.auth.purge_interval_secs.max(1)),
    )
    .spawn(shutdown_rx);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on {}", bind_address);

    let gate = state.auth_gate();
    let app_state = web::Data::new(state);
    let cors_config = config.cors.clone();

    HttpServer::new(move || {
        let gate = gate.clone();
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(&cors_config))
            .wrap(MetricsMiddleware)
            .wrap(CorrelationIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(|cfg| routes::configure(cfg, gate))
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await?;

    tracing::info!("Server shutting down. Stopping background jobs...");
    let _ = shutdown_tx.send(());
    match tokio::time::timeout(Duration::from_secs(5), purge_handle).await {
        Ok(Ok(())) => tracing::info!("revocation purge job stopped"),
        Ok(Err(e)) => tracing::error!("revocation purge job panicked: {:?}", e),
        Err(_) => tracing::warn!("revocation purge job did not stop within timeout"),
    }

    Ok(())
}
