// Live HTTP server for websocket tests

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use geoduel_backend::services::ports::{ContentProvider, RoomHashVerifier, RoomUpdatePublisher};
use geoduel_backend::{build_state, routes, AppState, StructuredLogger};

use super::fast_timing;

pub async fn build_test_state(
    content: Arc<dyn ContentProvider>,
    verifier: Arc<dyn RoomHashVerifier>,
    publisher: Option<Arc<dyn RoomUpdatePublisher>>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let mut builder = build_state()
        .with_timing(fast_timing())
        .with_content_provider(content)
        .with_verifier(verifier);
    if let Some(publisher) = publisher {
        builder = builder.with_publisher(publisher);
    }
    Ok(builder.build().await?)
}

/// Start the full route table on a random local port.
///
/// Returns the server handle (for graceful stop), the bound address and
/// the join handle of the server task.
pub async fn start_test_server(
    state: AppState,
) -> Result<
    (
        actix_web::dev::ServerHandle,
        std::net::SocketAddr,
        tokio::task::JoinHandle<Result<(), std::io::Error>>,
    ),
    Box<dyn std::error::Error>,
> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(StructuredLogger)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let server_handle = server.handle();
    let join = tokio::spawn(server);

    Ok((server_handle, addr, join))
}
