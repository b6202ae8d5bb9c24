// ============================================================================
// Sales Report
// ============================================================================
//
// - dates      - parsing of the requested bounds
// - aggregator - revenue, top customers, best seller (pure)
// - renderer   - ReportRenderer seam and the printpdf implementation
// - generator  - loads orders from the store and drives the above
//
// ============================================================================

mod aggregator;
mod dates;
mod generator;
mod renderer;

pub use aggregator::{
    build_report, popular_product, top_customers, CustomerRevenue, ProductSales, ReportOrder,
    SalesReport, TOP_CUSTOMERS_LIMIT,
};
pub use dates::parse_report_date;
pub use generator::{RenderedReport, ReportGenerator};
pub use renderer::{report_lines, PdfReportRenderer, ReportRenderer};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("start and end required")]
    MissingRange,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("rendering failed: {0}")]
    Render(String),
}

impl ReportError {
    /// Metric label for the failure.
    pub fn reason(&self) -> &'static str {
        match self {
            ReportError::MissingRange => "missing_range",
            ReportError::InvalidDate(_) => "invalid_date",
            ReportError::Store(_) => "store",
            ReportError::Render(_) => "render",
        }
    }
}
