// ============================================================================
// HTTP API (actix-web)
// ============================================================================
//
// - customers / products - catalog CRUD
// - orders               - order CRUD, status action, per-item save
// - reports              - sales report download
// - auth                 - staff-or-read-only middleware
// - error                - ApiError, the `{"detail": ...}` boundary
//
// Reads go straight to the store; writes go through the command handlers.
//
// ============================================================================

use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use rust_decimal::Decimal;

use crate::domain::customer::CustomerCommandHandler;
use crate::domain::order::{OrderCommandHandler, TransitionPolicy};
use crate::domain::product::ProductCommandHandler;
use crate::metrics::Metrics;
use crate::report::{ReportGenerator, ReportRenderer};
use crate::store::Store;

#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .app_data(crate::api::json_config())
                .app_data(crate::api::query_config())
                .wrap(crate::api::StaffOrReadOnly::new(vec![
                    crate::api::testing::STAFF_TOKEN.to_string(),
                ]))
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure(crate::api::configure),
        )
        .await
    };
}

mod auth;
mod customers;
mod dto;
mod error;
mod orders;
mod products;
mod reports;

#[cfg(test)]
mod testing;

pub use auth::StaffOrReadOnly;
pub use error::ApiError;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub customers: CustomerCommandHandler,
    pub products: ProductCommandHandler,
    pub orders: OrderCommandHandler,
    pub reports: ReportGenerator,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        policy: TransitionPolicy,
        default_shipping_cost: Decimal,
        renderer: Arc<dyn ReportRenderer>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            customers: CustomerCommandHandler::new(store.clone()),
            products: ProductCommandHandler::new(store.clone()),
            orders: OrderCommandHandler::new(store.clone(), policy, default_shipping_cost, metrics.clone()),
            reports: ReportGenerator::new(store.clone(), renderer, metrics),
            store,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    customers::configure(cfg);
    products::configure(cfg);
    orders::configure(cfg);
    reports::configure(cfg);
}

/// Malformed JSON bodies become 400 `{"detail": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}

/// Malformed query strings become 400 `{"detail": ...}`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}

pub async fn start_api_server(
    state: web::Data<AppState>,
    auth: StaffOrReadOnly,
    host: String,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("🌐 Starting API server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(auth.clone())
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
