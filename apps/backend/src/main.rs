use actix_web::{web, App, HttpServer};
use geoduel_backend::config::ServerConfig;
use geoduel_backend::infra::state::build_state;
use geoduel_backend::middleware::cors::cors_middleware;
use geoduel_backend::middleware::structured_logger::StructuredLogger;
use geoduel_backend::routes;
use geoduel_backend::services::cleanup::spawn_sweeper;
use geoduel_backend::telemetry;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state().with_config(config.clone()).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    spawn_sweeper(app_state.registry().clone());

    info!(
        host = %config.host,
        port = config.port,
        redis = config.redis_url.is_some(),
        geo_api = %config.geo_api_base_url,
        "Starting GeoDuel match server"
    );

    let data = web::Data::new(app_state);
    let origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
