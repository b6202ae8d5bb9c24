use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::{OrderFilter, Store};

use super::aggregator::{build_report, SalesReport};
use super::dates::parse_report_date;
use super::renderer::ReportRenderer;
use super::ReportError;

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ReportGenerator {
    store: Arc<dyn Store>,
    renderer: Arc<dyn ReportRenderer>,
    metrics: Arc<Metrics>,
}

impl ReportGenerator {
    pub fn new(store: Arc<dyn Store>, renderer: Arc<dyn ReportRenderer>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            renderer,
            metrics,
        }
    }

    /// Aggregate the orders created between `start` and `end` (inclusive,
    /// UTC calendar days).
    pub async fn sales_report(&self, start: NaiveDate, end: NaiveDate) -> Result<SalesReport, ReportError> {
        if start > end {
            return Ok(build_report(start, end, Vec::new(), &[]));
        }

        let orders = self
            .store
            .list_orders(&OrderFilter::created_between(start, end))
            .await?;

        let mut customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
        customer_ids.sort();
        customer_ids.dedup();
        let customers = self.store.customers_by_ids(&customer_ids).await?;

        Ok(build_report(start, end, orders, &customers))
    }

    /// Parse the raw bounds, aggregate and render. Empty bounds count as
    /// missing.
    pub async fn render_sales_report(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<RenderedReport, ReportError> {
        let started = Instant::now();
        let result = self.try_render(start, end).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(rendered) => info!(
                filename = %rendered.filename,
                bytes = rendered.bytes.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Sales report generated"
            ),
            Err(e) => warn!(error = %e, "Sales report failed"),
        }
        self.metrics.record_report(elapsed, result.as_ref().err().map(ReportError::reason));
        result
    }

    async fn try_render(&self, start: Option<&str>, end: Option<&str>) -> Result<RenderedReport, ReportError> {
        let (start, end) = match (start.filter(|s| !s.is_empty()), end.filter(|s| !s.is_empty())) {
            (Some(start), Some(end)) => (parse_report_date(start)?, parse_report_date(end)?),
            _ => return Err(ReportError::MissingRange),
        };

        let report = self.sales_report(start, end).await?;
        let renderer = self.renderer.clone();
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&report))
            .await
            .map_err(|e| ReportError::Render(e.to_string()))??;

        // Built from the parsed dates, never the raw query strings, so nothing
        // caller-supplied reaches Content-Disposition.
        Ok(RenderedReport {
            filename: format!("sales_{}_{}.{}", start, end, self.renderer.extension()),
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}
