//! Observability record of a single pipeline stage execution.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Append-only record of one stage of one request. Never mutated after
/// creation; `request_id` groups the events of a single pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub id: Uuid,
    pub request_id: Uuid,
    pub stage: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl TraceEvent {
    pub fn new(
        request_id: Uuid,
        stage: &str,
        started_at: DateTime<Utc>,
        success: bool,
        error_message: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            stage: stage.to_string(),
            started_at,
            ended_at: Utc::now(),
            success,
            error_message,
        }
    }

    pub fn latency_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_is_non_negative_for_ordered_timestamps() {
        let event = TraceEvent::new(Uuid::new_v4(), "Scraping", Utc::now(), true, None);
        assert!(event.latency_ms() >= 0);
    }

    #[test]
    fn test_failure_event_carries_error_message() {
        let event = TraceEvent::new(
            Uuid::new_v4(),
            "Inferring",
            Utc::now(),
            false,
            Some("inference provider is unavailable".to_string()),
        );
        assert!(!event.success);
        assert!(event.error_message.as_deref().unwrap().contains("unavailable"));
    }
}
