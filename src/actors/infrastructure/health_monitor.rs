use actix::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actors::core::{ComponentHealth, HealthStatus};
use crate::metrics::Metrics;
use crate::store::Store;

// ============================================================================
// Health Monitor Actor - Monitors system health
// ============================================================================
//
// Responsibilities:
// - Probe the store on a fixed interval
// - Track health status of all components
// - Mirror the overall status into the health gauge
// - Answer GetSystemHealth for the /health endpoint
//
// ============================================================================

const STORE_COMPONENT: &str = "store";

/// A probe slower than this reports the store as degraded.
const SLOW_PROBE: Duration = Duration::from_secs(1);

// ============================================================================
// Messages
// ============================================================================

/// Probe the store now and record the outcome.
#[derive(Message)]
#[rtype(result = "HealthStatus")]
pub struct ProbeStore;

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

// ============================================================================
// Health Monitor Actor
// ============================================================================

pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
    interval: Duration,
}

impl HealthMonitorActor {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>, interval: Duration) -> Self {
        Self {
            components: HashMap::new(),
            store,
            metrics,
            interval,
        }
    }

    /// Worst status wins. Unhealthy reasons are listed per component.
    fn compute_overall_status(&self) -> HealthStatus {
        let mut failing: Vec<String> = self
            .components
            .iter()
            .filter_map(|(name, health)| match &health.status {
                HealthStatus::Unhealthy(reason) => Some(format!("{name}: {reason}")),
                _ => None,
            })
            .collect();

        if !failing.is_empty() {
            failing.sort();
            return HealthStatus::Unhealthy(failing.join(", "));
        }

        let degraded = self
            .components
            .values()
            .any(|health| matches!(health.status, HealthStatus::Degraded(_)));
        if degraded {
            HealthStatus::Degraded("Some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        }
    }

    fn record(&mut self, component: String, status: HealthStatus, details: Option<String>) {
        tracing::debug!(
            component = %component,
            status = ?status,
            "Updated component health"
        );

        let mut health = ComponentHealth::new(component.clone(), status);
        if let Some(details) = details {
            health = health.with_details(details);
        }
        self.components.insert(component, health);
        self.metrics.set_store_health(self.compute_overall_status().level());
    }
}

impl Actor for HealthMonitorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(interval_secs = self.interval.as_secs(), "HealthMonitorActor started");

        ctx.notify(ProbeStore);
        ctx.run_interval(self.interval, |_act, ctx| {
            ctx.notify(ProbeStore);
        });
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<ProbeStore> for HealthMonitorActor {
    type Result = ResponseActFuture<Self, HealthStatus>;

    fn handle(&mut self, _msg: ProbeStore, _: &mut Self::Context) -> Self::Result {
        let store = self.store.clone();

        let probe = async move {
            let started = Instant::now();
            let outcome = store.ping().await;
            let elapsed = started.elapsed();
            let status = match outcome {
                Ok(()) if elapsed > SLOW_PROBE => {
                    HealthStatus::Degraded(format!("ping took {} ms", elapsed.as_millis()))
                }
                Ok(()) => HealthStatus::Healthy,
                Err(e) => {
                    tracing::warn!(error = %e, "Store probe failed");
                    HealthStatus::Unhealthy(e.to_string())
                }
            };
            (status, elapsed)
        };

        Box::pin(probe.into_actor(self).map(|(status, elapsed), act, _ctx| {
            act.record(
                STORE_COMPONENT.to_string(),
                status.clone(),
                Some(format!("ping {} ms", elapsed.as_millis())),
            );
            status
        }))
    }
}

impl Handler<GetSystemHealth> for HealthMonitorActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _msg: GetSystemHealth, _: &mut Self::Context) -> Self::Result {
        let overall_status = self.compute_overall_status();

        MessageResult(SystemHealth {
            overall_status,
            components: self.components.clone(),
            check_time: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn monitor() -> (Addr<HealthMonitorActor>, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let actor = HealthMonitorActor::new(
            Arc::new(InMemoryStore::new()),
            metrics.clone(),
            Duration::from_secs(3600),
        );
        (actor.start(), metrics)
    }

    #[actix::test]
    async fn test_probe_reports_healthy_store() {
        let (addr, metrics) = monitor();

        let status = addr.send(ProbeStore).await.unwrap();
        assert!(status.is_healthy());

        let health = addr.send(GetSystemHealth).await.unwrap();
        assert!(health.overall_status.is_healthy());
        assert!(health.components.contains_key(STORE_COMPONENT));
        assert_eq!(metrics.store_health_status.get(), 2);
    }

    #[actix::test]
    async fn test_unhealthy_component_dominates() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let mut actor = HealthMonitorActor::new(
            Arc::new(InMemoryStore::new()),
            metrics.clone(),
            Duration::from_secs(3600),
        );

        actor.record("store".to_string(), HealthStatus::Degraded("slow".to_string()), None);
        assert_eq!(actor.compute_overall_status().level(), 1);
        assert_eq!(metrics.store_health_status.get(), 1);

        actor.record(
            "replica".to_string(),
            HealthStatus::Unhealthy("connection refused".to_string()),
            Some("ping 0 ms".to_string()),
        );
        assert_eq!(
            actor.compute_overall_status(),
            HealthStatus::Unhealthy("replica: connection refused".to_string())
        );
        assert_eq!(metrics.store_health_status.get(), 0);
    }
}
