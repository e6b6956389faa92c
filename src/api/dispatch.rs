use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;
use crate::engine::planner::PlanOptions;
use crate::engine::service::{
    AutoAssignParams, AutoAssignReport, DispatchService, SimulateParams, SimulateReport, Strategy,
};
use crate::error::AppError;
use crate::models::plan::{ApplyRowResult, AssignmentPlanRow};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dispatch/simulate", post(simulate))
        .route("/dispatch/apply", post(apply))
        .route("/dispatch/auto-assign", post(auto_assign))
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    pub date: Option<String>,
    pub tz: Option<String>,
    pub slot_minutes: Option<u32>,
    pub prefer_area: Option<bool>,
    pub one_per_slot: Option<bool>,
}

#[derive(Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub plan: Vec<AssignmentPlanRow>,
}

#[derive(Deserialize)]
pub struct AutoAssignRequest {
    pub date: Option<String>,
    pub tz: Option<String>,
    pub strategy: Option<String>,
    pub annotate_areas: Option<bool>,
}

#[derive(Serialize)]
pub struct ApplyResponse {
    pub ok: bool,
    pub applied: u32,
    pub rows: Vec<ApplyRowResult>,
}

async fn simulate(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<SimulateRequest>,
) -> Result<Json<SimulateReport>, AppError> {
    let params = SimulateParams {
        date: super::parse_date(payload.date.as_deref())?,
        tz: super::parse_tz(payload.tz.as_deref(), &state.config)?,
        slot_minutes: payload.slot_minutes,
        options: PlanOptions {
            prefer_area: payload.prefer_area.unwrap_or(true),
            one_per_slot: payload.one_per_slot.unwrap_or(true),
        },
    };

    let started = Instant::now();
    let result = DispatchService::new(&state.store).simulate(&auth, &params);
    record_run(&state, "simulate", started, result.is_ok());

    let report = result?;
    state
        .metrics
        .plan_rows_total
        .with_label_values(&["assigned"])
        .inc_by(u64::from(report.assigned));
    state
        .metrics
        .plan_rows_total
        .with_label_values(&["unassigned"])
        .inc_by(u64::from(report.unassigned));

    Ok(Json(report))
}

async fn apply(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<ApplyRequest>,
) -> Result<Json<ApplyResponse>, AppError> {
    let started = Instant::now();
    let result = DispatchService::new(&state.store).apply(&auth, &payload.plan, Utc::now());
    record_run(&state, "apply", started, result.is_ok());

    let report = result?;
    state
        .metrics
        .orders_assigned_total
        .inc_by(u64::from(report.applied));

    Ok(Json(ApplyResponse {
        ok: true,
        applied: report.applied,
        rows: report.rows,
    }))
}

async fn auto_assign(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<AutoAssignRequest>,
) -> Result<Json<AutoAssignReport>, AppError> {
    let strategy = match payload.strategy.as_deref() {
        Some(raw) => Strategy::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown strategy '{raw}'")))?,
        None => Strategy::default(),
    };

    let params = AutoAssignParams {
        date: super::parse_date(payload.date.as_deref())?,
        tz: super::parse_tz(payload.tz.as_deref(), &state.config)?,
        strategy,
        annotate_areas: payload.annotate_areas.unwrap_or(false),
    };

    let started = Instant::now();
    let result = DispatchService::new(&state.store).auto_assign(&auth, &params, Utc::now());
    record_run(&state, "auto_assign", started, result.is_ok());

    let report = result?;
    state
        .metrics
        .orders_assigned_total
        .inc_by(u64::from(report.assigned));

    Ok(Json(report))
}

fn record_run(state: &AppState, mode: &str, started: Instant, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    state
        .metrics
        .dispatch_run_seconds
        .with_label_values(&[mode])
        .observe(started.elapsed().as_secs_f64());
    state
        .metrics
        .dispatch_runs_total
        .with_label_values(&[mode, outcome])
        .inc();
}
