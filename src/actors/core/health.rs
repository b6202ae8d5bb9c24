use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Health Check Abstractions
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    /// Gauge value: 0=Unhealthy, 1=Degraded, 2=Healthy
    pub fn level(&self) -> i64 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded(_) => 1,
            HealthStatus::Unhealthy(_) => 0,
        }
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(HealthStatus::Healthy.level(), 2);
        assert_eq!(HealthStatus::Degraded("slow".into()).level(), 1);
        assert_eq!(HealthStatus::Unhealthy("down".into()).level(), 0);
    }

    #[test]
    fn test_status_serializes_with_reason() {
        let json = serde_json::to_value(HealthStatus::Degraded("slow".into())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "degraded", "reason": "slow"}));

        let json = serde_json::to_value(HealthStatus::Healthy).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy"}));
    }
}
