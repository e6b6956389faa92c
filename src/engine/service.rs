use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::engine::applier;
use crate::engine::availability::BusySet;
use crate::engine::planner::{self, PlanOptions};
use crate::engine::slots;
use crate::error::AppError;
use crate::geo::UNKNOWN_AREA;
use crate::models::order::Order;
use crate::models::plan::{
    ApplyReport, AreaTally, AssignmentPlanRow, BucketDetail, Plan, RowOutcome,
};
use crate::models::staff::StaffShift;
use crate::store::DispatchStore;

pub const NO_STAFF_WARNING: &str = "no staff on duty for this date";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    AreaFirst,
    AnyFree,
}

impl Strategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "area-first" => Some(Self::AreaFirst),
            "any-free" => Some(Self::AnyFree),
            _ => None,
        }
    }

    fn options(self) -> PlanOptions {
        PlanOptions {
            prefer_area: matches!(self, Self::AreaFirst),
            one_per_slot: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulateParams {
    pub date: NaiveDate,
    pub tz: Tz,
    pub slot_minutes: Option<u32>,
    pub options: PlanOptions,
}

#[derive(Debug, Clone)]
pub struct AutoAssignParams {
    pub date: NaiveDate,
    pub tz: Tz,
    pub strategy: Strategy,
    pub annotate_areas: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulateReport {
    pub ok: bool,
    pub date: NaiveDate,
    pub assigned: u32,
    pub unassigned: u32,
    pub per_area: BTreeMap<String, AreaTally>,
    pub per_driver: BTreeMap<Uuid, u32>,
    pub details: Vec<BucketDetail>,
    pub plan: Vec<AssignmentPlanRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl SimulateReport {
    fn from_plan(date: NaiveDate, plan: Plan, warning: Option<String>) -> Self {
        Self {
            ok: true,
            date,
            assigned: plan.assigned,
            unassigned: plan.unassigned,
            per_area: plan.per_area,
            per_driver: plan.per_driver,
            details: plan.details,
            plan: plan.rows,
            warning,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AutoAssignReport {
    pub assigned: u32,
    pub details: Vec<BucketDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub struct DispatchService<'a, S: DispatchStore> {
    store: &'a S,
}

impl<'a, S: DispatchStore> DispatchService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn simulate(
        &self,
        auth: &AuthContext,
        params: &SimulateParams,
    ) -> Result<SimulateReport, AppError> {
        auth.require_dispatch()?;

        if let Some(slot) = params.slot_minutes {
            if !slots::is_on_grid(slot) {
                return Err(AppError::BadRequest(format!(
                    "slot_minutes {slot} is not on the 20-minute grid"
                )));
            }
        }

        let shifts = self.store.shifts_for_date(params.date)?;
        if shifts.is_empty() {
            warn!(date = %params.date, "no staff on duty; returning empty plan");
            return Ok(SimulateReport::from_plan(
                params.date,
                Plan::default(),
                Some(NO_STAFF_WARNING.to_string()),
            ));
        }

        let (orders, plan) = self.run_planner(
            params.date,
            params.tz,
            params.slot_minutes,
            &shifts,
            params.options,
        )?;

        info!(
            date = %params.date,
            orders = orders.len(),
            assigned = plan.assigned,
            unassigned = plan.unassigned,
            "simulated dispatch plan"
        );
        Ok(SimulateReport::from_plan(params.date, plan, None))
    }

    pub fn apply(
        &self,
        auth: &AuthContext,
        rows: &[AssignmentPlanRow],
        now: DateTime<Utc>,
    ) -> Result<ApplyReport, AppError> {
        auth.require_dispatch()?;

        if rows.is_empty() {
            return Err(AppError::BadRequest(
                "plan must contain at least one row".to_string(),
            ));
        }

        Ok(applier::apply(self.store, rows, now)?)
    }

    pub fn auto_assign(
        &self,
        auth: &AuthContext,
        params: &AutoAssignParams,
        now: DateTime<Utc>,
    ) -> Result<AutoAssignReport, AppError> {
        auth.require_dispatch()?;

        let shifts = self.store.shifts_for_date(params.date)?;
        if shifts.is_empty() {
            warn!(date = %params.date, "no staff on duty; nothing to assign");
            return Ok(AutoAssignReport {
                assigned: 0,
                details: Vec::new(),
                warning: Some(NO_STAFF_WARNING.to_string()),
            });
        }

        let (orders, plan) =
            self.run_planner(params.date, params.tz, None, &shifts, params.strategy.options())?;
        let report = applier::apply(self.store, &plan.rows, now)?;

        let annotated = if params.annotate_areas {
            self.annotate_resolved_areas(&orders, &plan.rows, &report)?
        } else {
            0
        };

        info!(
            date = %params.date,
            assigned = report.applied,
            annotated,
            "auto-assign pass finished"
        );
        Ok(AutoAssignReport {
            assigned: report.applied,
            details: plan.details,
            warning: None,
        })
    }

    fn run_planner(
        &self,
        date: NaiveDate,
        tz: Tz,
        slot_minutes: Option<u32>,
        shifts: &[StaffShift],
        options: PlanOptions,
    ) -> Result<(Vec<Order>, Plan), AppError> {
        let (day_start, day_end) = day_window(date, tz)?;
        let orders = self
            .store
            .unassigned_confirmed_orders(day_start, day_end, slot_minutes)?;
        let areas = self.store.active_areas()?;

        let mut user_ids: Vec<Uuid> = Vec::new();
        let mut seen = HashSet::new();
        for shift in shifts {
            if seen.insert(shift.user_id) {
                user_ids.push(shift.user_id);
            }
        }
        let profiles = self.store.profiles_for_users(&user_ids)?;
        let busy = BusySet::from_assignments(&self.store.busy_assignments(day_start, day_end)?);

        let plan = planner::plan(&orders, shifts, &profiles, &areas, busy, options);
        Ok((orders, plan))
    }

    fn annotate_resolved_areas(
        &self,
        orders: &[Order],
        rows: &[AssignmentPlanRow],
        report: &ApplyReport,
    ) -> Result<u32, AppError> {
        let untagged: HashSet<Uuid> = orders
            .iter()
            .filter(|order| {
                order
                    .service_area_tag
                    .as_deref()
                    .is_none_or(|tag| tag.trim().is_empty())
            })
            .map(|order| order.id)
            .collect();

        let mut annotated = 0;
        for (row, result) in rows.iter().zip(&report.rows) {
            if result.outcome == RowOutcome::Applied
                && untagged.contains(&row.order_id)
                && row.area_tag != UNKNOWN_AREA
                && self.store.annotate_area_tag(row.order_id, &row.area_tag)?
            {
                annotated += 1;
            }
        }
        Ok(annotated)
    }
}

pub fn day_window(date: NaiveDate, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::BadRequest("date out of range".to_string()))?;
    Ok((slots::to_instant(date, 0, tz), slots::to_instant(next, 0, tz)))
}
