// Private module declaration
mod server;

use std::time::Duration;

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

use crate::domain::core::DomainEvent;
use crate::domain::order::OrderEvent;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Committed order events, by event type
// - Totals recalculations
// - Rejected and failed commands
// - Sales report generation (count, failures, duration)
// - Store health as seen by the health monitor
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub order_events_committed: IntCounterVec,
    pub order_recalculations: IntCounter,
    pub commands_failed: IntCounterVec,

    // Report Metrics
    pub reports_generated: IntCounter,
    pub reports_failed: IntCounterVec,
    pub report_duration: Histogram,

    // Health
    pub store_health_status: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let order_events_committed = IntCounterVec::new(
            Opts::new("order_events_committed_total", "Order events persisted by the store"),
            &["event_type"],
        )?;
        registry.register(Box::new(order_events_committed.clone()))?;

        let order_recalculations = IntCounter::new(
            "order_recalculations_total",
            "Order totals recomputed before persisting",
        )?;
        registry.register(Box::new(order_recalculations.clone()))?;

        let commands_failed = IntCounterVec::new(
            Opts::new("commands_failed_total", "Commands rejected or failed"),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(commands_failed.clone()))?;

        // Report Metrics
        let reports_generated = IntCounter::new(
            "sales_reports_generated_total",
            "Sales reports rendered successfully",
        )?;
        registry.register(Box::new(reports_generated.clone()))?;

        let reports_failed = IntCounterVec::new(
            Opts::new("sales_reports_failed_total", "Sales reports that could not be produced"),
            &["reason"],
        )?;
        registry.register(Box::new(reports_failed.clone()))?;

        let report_duration = Histogram::with_opts(
            HistogramOpts::new("sales_report_duration_seconds", "Sales report generation duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
        )?;
        registry.register(Box::new(report_duration.clone()))?;

        // Health
        let store_health_status = IntGauge::new(
            "store_health_status",
            "Store health status (0=Unhealthy, 1=Degraded, 2=Healthy)",
        )?;
        registry.register(Box::new(store_health_status.clone()))?;

        Ok(Self {
            registry,
            order_events_committed,
            order_recalculations,
            commands_failed,
            reports_generated,
            reports_failed,
            report_duration,
            store_health_status,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record events that were just committed.
    pub fn record_order_events(&self, events: &[OrderEvent]) {
        for event in events {
            self.order_events_committed
                .with_label_values(&[event.event_type()])
                .inc();
            if event.reprices() {
                self.order_recalculations.inc();
            }
        }
    }

    pub fn record_command_failure(&self, operation: &str, reason: &str) {
        self.commands_failed.with_label_values(&[operation, reason]).inc();
    }

    pub fn record_report(&self, elapsed: Duration, failure: Option<&str>) {
        self.report_duration.observe(elapsed.as_secs_f64());
        match failure {
            None => self.reports_generated.inc(),
            Some(reason) => self.reports_failed.with_label_values(&[reason]).inc(),
        }
    }

    pub fn set_store_health(&self, level: i64) {
        self.store_health_status.set(level);
    }
}
