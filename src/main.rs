use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, middleware, web};

use celulas::config::Config;
use celulas::dashboard::StatsCache;
use celulas::db;
use celulas::errors::ApiErrorResponse;
use celulas::handlers::api_v1;
use celulas::state::AppState;
use celulas::store::PgStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;

    let cache = StatsCache::open(&config.stats_cache_path);
    let state = web::Data::new(AppState::new(Arc::new(PgStore::new(pool)), cache));

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(web::scope("/api/v1").configure(api_v1::configure))
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                HttpResponse::NotFound().json(ApiErrorResponse {
                    error: "Not found".to_string(),
                    details: None,
                })
            }))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
