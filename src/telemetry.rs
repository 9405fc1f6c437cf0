use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Prefix carried by every suppressed augmentation error
pub const DIAGNOSTIC_PREFIX: &str = "Odoo github extension";

/// Initialize structured logging on stderr.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_telemetry(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!("Telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for one augmentation pass
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one augmentation pass
pub fn create_augmentation_span(pass_id: &str, branch_selector: &str, body_selector: &str) -> tracing::Span {
    tracing::info_span!(
        "augmentation_pass",
        pass.id = pass_id,
        selector.branch = branch_selector,
        selector.body = body_selector,
    )
}
