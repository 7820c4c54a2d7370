use actix_cors::Cors;
use actix_web::http::header;

/// Build the CORS middleware from the configured origins.
///
/// An empty list allows any origin. Only `GET` is routed: websocket
/// upgrades and the status endpoint.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }
    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}
