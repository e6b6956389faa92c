use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::models::area::GeoPoint;
use crate::models::staff::{StaffProfile, StaffShift};
use crate::state::AppState;
use crate::store::DispatchStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/staff", post(upsert_staff).get(list_staff))
        .route("/shifts", post(create_shift).get(list_shifts))
}

#[derive(Deserialize)]
pub struct UpsertStaffRequest {
    pub user_id: Option<Uuid>,
    pub display_name: String,
    #[serde(default)]
    pub area_tags: Vec<String>,
    pub home: Option<GeoPoint>,
}

#[derive(Deserialize)]
pub struct CreateShiftRequest {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub tz: Option<String>,
}

#[derive(Deserialize)]
pub struct ShiftsQuery {
    pub date: Option<String>,
}

async fn upsert_staff(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<UpsertStaffRequest>,
) -> Result<Json<StaffProfile>, AppError> {
    auth.require_admin()?;

    if payload.display_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "display_name cannot be empty".to_string(),
        ));
    }

    let area_tags = payload
        .area_tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let profile = StaffProfile {
        user_id: payload.user_id.unwrap_or_else(Uuid::new_v4),
        display_name: payload.display_name,
        area_tags,
        home: payload.home,
    };

    state.store.upsert_profile(profile.clone());
    Ok(Json(profile))
}

async fn list_staff(State(state): State<Arc<AppState>>) -> Json<Vec<StaffProfile>> {
    Json(state.store.list_profiles())
}

async fn create_shift(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<CreateShiftRequest>,
) -> Result<Json<StaffShift>, AppError> {
    auth.require_admin()?;

    if payload.start_minutes >= payload.end_minutes {
        return Err(AppError::BadRequest(
            "start_minutes must be before end_minutes".to_string(),
        ));
    }

    if payload.end_minutes > 1440 {
        return Err(AppError::BadRequest(
            "end_minutes cannot pass midnight".to_string(),
        ));
    }

    let tz = super::parse_tz(payload.tz.as_deref(), &state.config)?;

    let shift = StaffShift {
        id: Uuid::new_v4(),
        user_id: payload.user_id,
        work_date: payload.date,
        start_minutes: payload.start_minutes,
        end_minutes: payload.end_minutes,
        timezone: tz.name().to_string(),
    };

    state.store.insert_shift(shift.clone());
    Ok(Json(shift))
}

async fn list_shifts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShiftsQuery>,
) -> Result<Json<Vec<StaffShift>>, AppError> {
    let date = super::parse_date(query.date.as_deref())?;
    Ok(Json(state.store.shifts_for_date(date)?))
}
