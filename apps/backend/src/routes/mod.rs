use actix_web::web;

pub mod health;
pub mod realtime;

/// Register every route. `main` and the integration tests share this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Status: /status
    cfg.configure(health::configure_routes);

    // Websockets: /ws, /ws/discovery
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
