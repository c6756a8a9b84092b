#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the emissions dashboard.
//!
//! Loads the dataset, feature schema and model once at startup, then
//! serves the page layout, the callback dispatch endpoint and the raw
//! projection endpoints under `/api`. Every worker shares the same
//! read-only [`AppState`].

mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use carbon_dash_dashboard::{AppContext, CallbackRegistry, DashboardConfig, default_registry};

/// Shared application state.
pub struct AppState {
    /// Dataset, schema, predictor and configuration.
    pub ctx: AppContext,
    /// Every dashboard callback.
    pub registry: CallbackRegistry,
}

/// Bind address and port from `BIND_ADDR` and `PORT`.
#[must_use]
pub fn bind_address() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    (bind_addr, port)
}

/// Starts the dashboard API server.
///
/// Builds the [`AppContext`] and callback registry from `config`, then
/// starts the Actix-Web HTTP server. The caller provides the async
/// runtime (e.g. via `#[actix_web::main]`) and initialises logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset, model or schema
/// cannot be loaded, or if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: DashboardConfig) -> std::io::Result<()> {
    let registry = default_registry(&config).map_err(std::io::Error::other)?;
    let ctx = AppContext::load(config).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState { ctx, registry });

    let (bind_addr, port) = bind_address();
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/nations", web::get().to(handlers::nations))
                    .route("/layout", web::get().to(handlers::layout))
                    .route("/callbacks", web::get().to(handlers::callbacks))
                    .route("/callbacks", web::post().to(handlers::dispatch))
                    .route("/projection", web::get().to(handlers::projection))
                    .route("/projection/all", web::get().to(handlers::projection_all)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
