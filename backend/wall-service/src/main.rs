use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wall_service::config::Config;
use wall_service::handlers::{configure_routes, AppState};
use wall_service::repository::PgWallStore;
use wall_service::services::FeedCache;
use wall_service::SERVICE_NAME;

fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wall_service=info,actix_web=info".into());

    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(config.app.is_production());

    info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    // Database
    let db_cfg = match db_pool::DbConfig::from_env(SERVICE_NAME) {
        Ok(cfg) => cfg.with_bounds(
            config.database.max_connections,
            config.database.min_connections,
        ),
        Err(e) => {
            error!("Database configuration failed: {}", e);
            std::process::exit(1);
        }
    };
    db_cfg.log_config();
    let pool = match db_pool::create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        error!("Database migrations failed: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations applied");

    // Media bucket
    let s3 = s3_utils::S3Client::from_env().await;
    match s3.health_check().await {
        Ok(()) => info!(bucket = %s3.config().bucket, "Media storage reachable"),
        Err(e) => warn!(bucket = %s3.config().bucket, "Media storage check failed: {}", e),
    }

    let cache = if config.feed.cache_enabled {
        info!(
            ttl_secs = config.feed.cache_ttl_secs,
            max_entries = config.feed.cache_max_entries,
            "Feed cache enabled"
        );
        Some(Arc::new(FeedCache::with_capacity(
            Duration::from_secs(config.feed.cache_ttl_secs),
            config.feed.cache_max_entries,
        )))
    } else {
        info!("Feed cache disabled by configuration");
        None
    };

    let state = web::Data::new(AppState::new(
        Arc::new(PgWallStore::new(pool)),
        Arc::new(s3.operations()),
        cache,
    ));

    let bind_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("HTTP server listening on {}", bind_addr);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure_routes)
    })
    .bind(&bind_addr)?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await?;
    info!("{} stopped", SERVICE_NAME);
    Ok(())
}
