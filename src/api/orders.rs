use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::engine::slots;
use crate::error::AppError;
use crate::models::area::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::models::slot::DeliverySlot;
use crate::state::AppState;
use crate::store::{CancelOutcome, DispatchStore};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/slots", get(list_slots))
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/unassign", post(unassign_order))
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
    pub tz: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub date: Option<String>,
    pub slot_minutes: Option<u32>,
    pub tz: Option<String>,
    pub address: Option<GeoPoint>,
    pub service_area_tag: Option<String>,
}

async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<DeliverySlot>>, AppError> {
    let date = super::parse_date(query.date.as_deref())?;
    let tz = super::parse_tz(query.tz.as_deref(), &state.config)?;

    let slots = slots::filter_past(
        slots::generate_slots(),
        date,
        state.config.slot_lead_minutes,
        Utc::now(),
        tz,
    );
    Ok(Json(slots))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let date = super::parse_date(payload.date.as_deref())?;
    let tz = super::parse_tz(payload.tz.as_deref(), &state.config)?;

    let slot_minutes = payload
        .slot_minutes
        .ok_or_else(|| AppError::BadRequest("slot_minutes is required".to_string()))?;
    if !slots::is_on_grid(slot_minutes) {
        return Err(AppError::BadRequest(format!(
            "slot_minutes {slot_minutes} is not on the 20-minute grid"
        )));
    }

    let service_area_tag = payload
        .service_area_tag
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty());

    let order = Order {
        id: Uuid::new_v4(),
        address: payload.address,
        service_area_tag,
        delivery_slot_start: slots::to_instant(date, slot_minutes, tz),
        delivery_slot_minutes: slot_minutes,
        status: OrderStatus::Confirmed,
        assigned_to: None,
        assigned_to_label: None,
        assigned_at: None,
        created_at: Utc::now(),
    };

    state.store.insert_order(order.clone());
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .get_order(id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    match state.store.cancel_order(id) {
        CancelOutcome::Canceled(order) => Ok(Json(order)),
        CancelOutcome::NotCancelable(status) => Err(AppError::Conflict(format!(
            "order {} cannot be canceled in status {:?}",
            id, status
        ))),
        CancelOutcome::NotFound => Err(AppError::NotFound(format!("order {} not found", id))),
    }
}

async fn unassign_order(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    auth.require_dispatch()?;

    if state.store.get_order(id).is_none() {
        return Err(AppError::NotFound(format!("order {} not found", id)));
    }

    if !state.store.conditional_unassign(id)? {
        return Err(AppError::Conflict(format!(
            "order {} has no assignee or is not confirmed",
            id
        )));
    }

    let order = state
        .store
        .get_order(id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;
    Ok(Json(order))
}
