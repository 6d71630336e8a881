//! Trace Recorder — ships per-stage TraceEvents to the observability backend.
//!
//! FAILURE CONTAINMENT: observability must never break the user-facing flow.
//! The pipeline only ever reaches this module through `record_best_effort`,
//! which logs and discards any backend error.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::trace::TraceEvent;

const SERVICE: &str = "observability backend";

/// Destination for trace events. The pipeline depends on this trait so tests
/// can capture events or simulate a backend outage.
#[async_trait]
pub trait TraceSink: Send + Sync {
    async fn record(&self, event: &TraceEvent) -> Result<(), AppError>;
}

/// Records `event`, swallowing any failure. This is the only call site shape
/// the pipeline uses.
pub async fn record_best_effort(sink: &dyn TraceSink, event: TraceEvent) {
    if let Err(e) = sink.record(&event).await {
        warn!(
            stage = %event.stage,
            "Dropping trace event — {SERVICE} error: {e}"
        );
    }
}

/// Production observability client.
#[derive(Clone)]
pub struct TraceRecorder {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TraceRecorder {
    pub fn new(api_key: String, base_url: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl TraceSink for TraceRecorder {
    async fn record(&self, event: &TraceEvent) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/private/traces",
                self.base_url.trim_end_matches('/')
            ))
            .header("authorization", &self.api_key)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::from_transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_status(SERVICE, status));
        }

        debug!(
            stage = %event.stage,
            latency_ms = event.latency_ms(),
            "Trace event recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    pub struct FailingSink;

    #[async_trait]
    impl TraceSink for FailingSink {
        async fn record(&self, _event: &TraceEvent) -> Result<(), AppError> {
            Err(AppError::UpstreamUnavailable {
                service: SERVICE,
                message: "simulated outage".to_string(),
            })
        }
    }

    pub struct CapturingSink(pub Mutex<Vec<TraceEvent>>);

    #[async_trait]
    impl TraceSink for CapturingSink {
        async fn record(&self, event: &TraceEvent) -> Result<(), AppError> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn event(stage: &str) -> TraceEvent {
        TraceEvent::new(Uuid::new_v4(), stage, Utc::now(), true, None)
    }

    #[tokio::test]
    async fn test_record_best_effort_swallows_backend_failure() {
        record_best_effort(&FailingSink, event("Scraping")).await;
    }

    #[tokio::test]
    async fn test_record_best_effort_delivers_to_working_sink() {
        let sink = CapturingSink(Mutex::new(Vec::new()));
        record_best_effort(&sink, event("Inferring")).await;
        let captured = sink.0.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].stage, "Inferring");
    }
}
