use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatch_runs_total: IntCounterVec,
    pub dispatch_run_seconds: HistogramVec,
    pub plan_rows_total: IntCounterVec,
    pub orders_assigned_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatch_runs_total = IntCounterVec::new(
            Opts::new(
                "dispatch_runs_total",
                "Total dispatch runs by mode and outcome",
            ),
            &["mode", "outcome"],
        )
        .expect("valid dispatch_runs_total metric");

        let dispatch_run_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_run_seconds",
                "Duration of dispatch runs in seconds",
            ),
            &["mode"],
        )
        .expect("valid dispatch_run_seconds metric");

        let plan_rows_total = IntCounterVec::new(
            Opts::new("plan_rows_total", "Plan rows produced by disposition"),
            &["disposition"],
        )
        .expect("valid plan_rows_total metric");

        let orders_assigned_total = IntCounter::new(
            "orders_assigned_total",
            "Orders assigned to staff via apply or auto-assign",
        )
        .expect("valid orders_assigned_total metric");

        registry
            .register(Box::new(dispatch_runs_total.clone()))
            .expect("register dispatch_runs_total");
        registry
            .register(Box::new(dispatch_run_seconds.clone()))
            .expect("register dispatch_run_seconds");
        registry
            .register(Box::new(plan_rows_total.clone()))
            .expect("register plan_rows_total");
        registry
            .register(Box::new(orders_assigned_total.clone()))
            .expect("register orders_assigned_total");

        Self {
            registry,
            dispatch_runs_total,
            dispatch_run_seconds,
            plan_rows_total,
            orders_assigned_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
