//! Structured run logging.

use tracing::{info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for an embedding binary.
///
/// Colored output by default; JSON when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("clipscout=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

/// Run-scoped logger with consistent structured fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
}

impl RunLogger {
    pub fn new(run_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            operation: operation.into(),
        }
    }

    pub fn stage_done(&self, stage: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage = stage,
            "stage complete"
        );
    }

    pub fn degraded(&self, stage: &str, detail: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage = stage,
            "degraded: {}", detail
        );
    }

    pub fn completed(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Tracing span carrying the run context.
    pub fn span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, operation = %self.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_fields() {
        let logger = RunLogger::new("run-123", "analyze");
        assert_eq!(logger.run_id(), "run-123");
    }
}
