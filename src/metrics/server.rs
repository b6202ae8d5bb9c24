use actix::Addr;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

use crate::actors::{GetSystemHealth, HealthMonitorActor};
use super::Metrics;

/// Start the metrics HTTP server (`/metrics` and `/health`).
pub async fn start_metrics_server(
    metrics: Arc<Metrics>,
    health: Addr<HealthMonitorActor>,
    host: String,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://{}:{}/metrics", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(health.clone()))
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler));
}

async fn metrics_handler(metrics: web::Data<Arc<Metrics>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(health: web::Data<Addr<HealthMonitorActor>>) -> impl Responder {
    match health.send(GetSystemHealth).await {
        Ok(system) => {
            let mut response = if system.overall_status.is_unhealthy() {
                HttpResponse::ServiceUnavailable()
            } else {
                HttpResponse::Ok()
            };
            response.json(serde_json::json!({
                "service": "order-desk",
                "health": system,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Health monitor unreachable");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "service": "order-desk",
                "health": { "overall_status": { "status": "unhealthy", "reason": "health monitor unreachable" } },
            }))
        }
    }
}
