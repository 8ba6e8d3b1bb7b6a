#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web JSON API for the crime dashboard.
//!
//! Each endpoint runs one pipeline query against the shared, read-only
//! [`Dataset`] and returns the result as JSON for the chart and map
//! frontend to render.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_dashboard_analytics::Dataset;

/// Shared application state.
pub struct AppState {
    /// The dataset loaded at startup.
    pub dataset: Arc<Dataset>,
}

/// Address the server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, falling back to `127.0.0.1:8080`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        Self { bind_addr, port }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/options", web::get().to(handlers::options))
            .route("/aggregate", web::get().to(handlers::aggregate))
            .route("/breakdown", web::get().to(handlers::breakdown))
            .route("/timeseries", web::get().to(handlers::timeseries))
            .route("/map", web::get().to(handlers::map))
            .route("/deprivation", web::get().to(handlers::deprivation)),
    );
}

/// Starts the API server over an already loaded dataset.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(dataset: Arc<Dataset>, config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState { dataset });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
