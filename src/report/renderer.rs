use printpdf::{IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfPageIndex};

use super::aggregator::SalesReport;
use super::ReportError;

// ============================================================================
// Report Rendering
// ============================================================================

pub trait ReportRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn render(&self, report: &SalesReport) -> Result<Vec<u8>, ReportError>;
}

/// Text lines making up the report body, in print order.
pub fn report_lines(report: &SalesReport) -> Vec<String> {
    let mut lines = vec![
        "Sales report".to_string(),
        format!("Period: {} to {}", report.start, report.end),
        format!("Revenue: {:.2}", report.revenue),
        format!("Orders: {}", report.orders_count),
        String::new(),
        "Top customers:".to_string(),
    ];

    if report.top_customers.is_empty() {
        lines.push("  none".to_string());
    }
    for (rank, entry) in report.top_customers.iter().enumerate() {
        let customer = &entry.customer;
        let name = customer.full_name.as_deref().unwrap_or(customer.email.as_str());
        let company = customer
            .company_name
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        lines.push(format!(
            "  {}. {}{} - {:.2} in {} order(s)",
            rank + 1,
            name,
            company,
            entry.total,
            entry.orders
        ));
    }

    lines.push(match &report.popular_product {
        Some(best) => format!("Best seller: {} ({} pcs)", best.product.name, best.quantity),
        None => "Best seller: none".to_string(),
    });

    lines.push(String::new());
    lines.push("Orders:".to_string());
    for entry in &report.orders {
        let order = &entry.order;
        let customer = entry
            .customer
            .as_ref()
            .map(|c| c.email.as_str().to_string())
            .unwrap_or_else(|| order.customer_id.to_string());
        lines.push(format!(
            "  {} {} {} {} {:.2}",
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.id,
            customer,
            order.status,
            order.total
        ));
    }
    lines
}

// ============================================================================
// PDF (printpdf)
// ============================================================================

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const LAYER: &str = "Report";

/// Embedded so names outside Latin-1 keep their glyphs; builtin fonts are
/// limited to WinAnsi.
const DEJAVU_SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    fn lines_per_page() -> usize {
        ((PAGE_HEIGHT.0 - 2.0 * MARGIN) / LINE_HEIGHT) as usize
    }

    fn write_page(
        doc: &PdfDocumentReference,
        font: &IndirectFontRef,
        page: PdfPageIndex,
        layer: PdfLayerIndex,
        lines: &[String],
    ) {
        let layer = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT.0 - MARGIN;
        for line in lines {
            layer.use_text(line.as_str(), FONT_SIZE, Mm(MARGIN), Mm(y), font);
            y -= LINE_HEIGHT;
        }
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, report: &SalesReport) -> Result<Vec<u8>, ReportError> {
        let title = format!("Sales report {} - {}", report.start, report.end);
        let (doc, first_page, first_layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, LAYER);
        let font = doc
            .add_external_font(DEJAVU_SANS)
            .map_err(|e| ReportError::Render(e.to_string()))?;

        let lines = report_lines(report);
        let mut chunks = lines.chunks(Self::lines_per_page());

        if let Some(chunk) = chunks.next() {
            Self::write_page(&doc, &font, first_page, first_layer, chunk);
        }
        for chunk in chunks {
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER);
            Self::write_page(&doc, &font, page, layer, chunk);
        }

        doc.save_to_bytes().map_err(|e| ReportError::Render(e.to_string()))
    }
}
