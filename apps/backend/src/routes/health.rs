use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    app_version: &'static str,
    time: String,
    uptime_secs: i64,
    active_matches: usize,
    discovery_connections: usize,
}

async fn status(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let now = OffsetDateTime::now_utc();
    let time = now
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(HttpResponse::Ok().json(StatusResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        time,
        uptime_secs: (now - app_state.started_at()).whole_seconds(),
        active_matches: app_state.registry().len(),
        discovery_connections: app_state.discovery().len(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/status").route(web::get().to(status)));
}
