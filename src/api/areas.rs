use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::models::area::{GeoPoint, ServiceArea};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/areas", post(create_area).get(list_areas))
        .route("/areas/:tag", patch(update_area))
}

#[derive(Deserialize)]
pub struct CreateAreaRequest {
    pub tag: String,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateAreaRequest {
    pub active: bool,
}

async fn create_area(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<CreateAreaRequest>,
) -> Result<Json<ServiceArea>, AppError> {
    auth.require_admin()?;

    let tag = payload.tag.trim().to_string();
    if tag.is_empty() {
        return Err(AppError::BadRequest("tag cannot be empty".to_string()));
    }

    if !payload.radius_km.is_finite() || payload.radius_km <= 0.0 {
        return Err(AppError::BadRequest("radius_km must be > 0".to_string()));
    }

    let area = ServiceArea {
        tag,
        center: payload.center,
        radius_km: payload.radius_km,
        active: payload.active.unwrap_or(true),
    };

    if !state.store.insert_area(area.clone())? {
        return Err(AppError::Conflict(format!(
            "area '{}' already exists",
            area.tag
        )));
    }

    Ok(Json(area))
}

async fn list_areas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceArea>>, AppError> {
    Ok(Json(state.store.list_areas()?))
}

async fn update_area(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(tag): Path<String>,
    Json(payload): Json<UpdateAreaRequest>,
) -> Result<Json<ServiceArea>, AppError> {
    auth.require_admin()?;

    let area = state
        .store
        .set_area_active(&tag, payload.active)?
        .ok_or_else(|| AppError::NotFound(format!("area '{}' not found", tag)))?;

    Ok(Json(area))
}
