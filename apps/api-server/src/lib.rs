//! # Cattery API Server
//!
//! Actix-web HTTP surface for cats, accounts and adoptions. The binary in
//! `main.rs` wires configuration and runs [`build_app`]; integration tests
//! drive the same app against in-memory storage.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::ErrorHandlers;
use actix_web::{App, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
pub mod background;
pub mod config;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;

use middleware::cors::Cors;
use middleware::error::attach_internal_details;
use observability::RequestIdMiddleware;
use state::AppState;

/// Build the application: routes, error details, CORS, request IDs and request logging.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = Cors::new(state.config.cors.allowed_origins.clone());

    App::new()
        .wrap(ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, attach_internal_details))
        .wrap(cors)
        .wrap(RequestIdMiddleware)
        .wrap(TracingLogger::default())
        .app_data(state)
        .configure(handlers::configure_routes)
}
