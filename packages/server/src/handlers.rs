//! HTTP handler functions for the crime dashboard API.
//!
//! Handlers are thin: parse the query string, run one pipeline function,
//! and map the outcome onto a status code.

use actix_web::{HttpResponse, web};
use crime_dashboard_analytics::{
    AnalyticsError, aggregate as run_aggregate, deprivation_scatter, map_points, time_series,
};
use crime_dashboard_server_models::{
    AggregateParams, ApiError, ApiHealth, ApiOptions, DeprivationParams, InvalidParamError,
    MapParams, TimeSeriesParams,
};
use serde::Serialize;

use crate::AppState;

fn bad_request(e: &InvalidParamError) -> HttpResponse {
    log::debug!("Rejected query: {e}");
    HttpResponse::BadRequest().json(ApiError::new(e))
}

fn respond<T: Serialize>(result: Result<T, AnalyticsError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e @ AnalyticsError::InvalidPopulation(_)) => {
            log::error!("Failed to compute rate: {e}");
            HttpResponse::UnprocessableEntity().json(ApiError::new(e))
        }
    }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.dataset.records().len(),
    })
}

/// `GET /api/options`
///
/// Returns the values each dashboard dropdown offers.
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiOptions::new(state.dataset.years()))
}

/// `GET /api/aggregate`
pub async fn aggregate(
    state: web::Data<AppState>,
    params: web::Query<AggregateParams>,
) -> HttpResponse {
    match params.to_query() {
        Ok(query) => respond(run_aggregate(&state.dataset, &query)),
        Err(e) => bad_request(&e),
    }
}

/// `GET /api/breakdown`
///
/// Like `/api/aggregate`, but the filter on the grouped dimension is
/// ignored so every bar of the chart is shown.
pub async fn breakdown(
    state: web::Data<AppState>,
    params: web::Query<AggregateParams>,
) -> HttpResponse {
    match params.to_query() {
        Ok(query) => respond(run_aggregate(&state.dataset, &query.breakdown())),
        Err(e) => bad_request(&e),
    }
}

/// `GET /api/timeseries`
pub async fn timeseries(
    state: web::Data<AppState>,
    params: web::Query<TimeSeriesParams>,
) -> HttpResponse {
    match params.to_query() {
        Ok(query) => respond(time_series(&state.dataset, &query.relaxed())),
        Err(e) => bad_request(&e),
    }
}

/// `GET /api/map`
pub async fn map(state: web::Data<AppState>, params: web::Query<MapParams>) -> HttpResponse {
    match params.to_query() {
        Ok(query) => respond(map_points(&state.dataset, &query)),
        Err(e) => bad_request(&e),
    }
}

/// `GET /api/deprivation`
pub async fn deprivation(
    state: web::Data<AppState>,
    params: web::Query<DeprivationParams>,
) -> HttpResponse {
    respond(deprivation_scatter(&state.dataset, &params.to_query()))
}
