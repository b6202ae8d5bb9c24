use std::sync::Arc;

use actix_web::web;
use rust_decimal_macros::dec;

use crate::domain::order::TransitionPolicy;
use crate::metrics::Metrics;
use crate::report::PdfReportRenderer;
use crate::store::InMemoryStore;

use super::AppState;

pub const STAFF_TOKEN: &str = "staff-token";

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {STAFF_TOKEN}"))
}

pub fn state() -> web::Data<AppState> {
    state_with(Arc::new(InMemoryStore::new()), TransitionPolicy::Permissive)
}

pub fn state_with(store: Arc<InMemoryStore>, policy: TransitionPolicy) -> web::Data<AppState> {
    let metrics = Arc::new(Metrics::new().unwrap());
    web::Data::new(AppState::new(
        store,
        policy,
        dec!(100),
        Arc::new(PdfReportRenderer),
        metrics,
    ))
}
