pub mod areas;
pub mod dispatch;
pub mod orders;
pub mod staff;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::StoreCounts;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(areas::router())
        .merge(dispatch::router())
        .merge(orders::router())
        .merge(staff::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    orders: usize,
    shifts: usize,
    profiles: usize,
    areas: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let StoreCounts {
        orders,
        shifts,
        profiles,
        areas,
    } = state.store.counts()?;
    Ok(Json(HealthResponse {
        status: "ok",
        orders,
        shifts,
        profiles,
        areas,
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("date is required".to_string()))?;
    raw.parse::<NaiveDate>()
        .map_err(|_| AppError::BadRequest(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn parse_tz(raw: Option<&str>, config: &Config) -> Result<Tz, AppError> {
    match raw {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| AppError::BadRequest(format!("unknown timezone '{name}'"))),
        None => Ok(config.default_tz),
    }
}
