// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, revocation store and start HTTP server

use actix_web::middleware::{from_fn, Compress, Logger};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use photo_gallery_api::config::{self, Config, RevocationBackend};
use photo_gallery_api::handlers;
use photo_gallery_api::services::{
    start_cleanup_task, start_prune_task, MemoryRevocationStore, PgRevocationStore,
    RequestThrottle, RevocationStore, TokenBlacklist, TokenService,
};
use std::io;
use std::sync::Arc;

/// Seconds between rate limiter key sweeps
const THROTTLE_PRUNE_INTERVAL_SECS: u64 = 60;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Initialize logging first so configuration warnings are visible
    if std::env::var("RUST_LOG").is_err() {
        let log_level = std::env::var("LOG_LEVEL")
            .ok()
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| "info".to_string());
        std::env::set_var("RUST_LOG", format!("{},actix_web=info,sqlx=warn", log_level));
    }
    env_logger::init();

    // 3. Load configuration
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting photo-gallery-api...");
    log::info!("Environment: {}", config.environment);
    log::info!("Log level: {}", config.log_level);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        if let Err(e) = config::run_migrations(&pool).await {
            log::error!("Failed to run migrations: {}", e);
            std::process::exit(1);
        }
    }

    // 5. Token services
    let tokens = web::Data::new(TokenService::from_config(&config));

    let store: Arc<dyn RevocationStore> = match config.revocation_store {
        RevocationBackend::Postgres => Arc::new(PgRevocationStore::new(pool.clone())),
        RevocationBackend::Memory => Arc::new(MemoryRevocationStore::new()),
    };
    let blacklist = Arc::new(TokenBlacklist::new(store));
    log::info!("Token revocation store: {}", blacklist.backend());

    start_cleanup_task(blacklist.clone(), config.revocation_cleanup_interval_secs);
    log::info!(
        "Started revocation cleanup task (interval: {}s)",
        config.revocation_cleanup_interval_secs
    );

    // 6. Rate limiting
    let throttle = Arc::new(RequestThrottle::new(config.rate_limit_enabled));
    if throttle.is_enabled() {
        start_prune_task(throttle.clone(), THROTTLE_PRUNE_INTERVAL_SECS);
    } else {
        log::warn!("Rate limiting is disabled");
    }

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let pool = web::Data::new(pool);
    let blacklist = web::Data::from(blacklist);
    let throttle = web::Data::from(throttle);

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(blacklist.clone())
            .app_data(throttle.clone())
            // Middleware (last wrap runs first)
            .wrap(from_fn(handlers::rate_limit))
            .wrap(from_fn(handlers::request_id))
            .wrap(Logger::new(
                r#"%a "%r" %s %b %Dms request_id=%{x-request-id}o"#,
            ))
            .wrap(Compress::default())
            // Routes
            .configure(handlers::configure)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&server_addr)?
    .run()
    .await
}
