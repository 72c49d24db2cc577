//! Tracing setup with file-based OTLP export.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → SDK tracer → OTLP JSON lines → rotating file
//! ```
//!
//! Spans land in `/host/.local/share/zellij/zerocost/zerocost-otlp.json`
//! (10 MB per file, 3 numbered backups). Web requests carry the current trace
//! context in their context map, so the span handling a reply is parented to
//! the span that sent the request.
//!
//! The level comes from the `trace_level` plugin option and defaults to
//! `info`. It accepts any `EnvFilter` directive, e.g. `zerocost=debug`.

mod exporter;
mod rotation;

pub use exporter::{create_tracer_provider, otlp_document, SCOPE_NAME};
pub use rotation::{RotatingFile, MAX_BACKUP_FILES, MAX_FILE_SIZE_BYTES};

use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the live trace file inside the data directory.
pub const TRACE_FILE_NAME: &str = "zerocost-otlp.json";

/// Installs the global subscriber. Later calls are no-ops.
///
/// Tracing is optional: if the data directory cannot be created the plugin
/// runs without a subscriber.
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let data_dir = crate::infrastructure::paths::get_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![
        opentelemetry::KeyValue::new("service.name", "ZeroCost"),
        opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = create_tracer_provider(data_dir.join(TRACE_FILE_NAME), resource);
    let tracer = provider.tracer(SCOPE_NAME);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(OpenTelemetryLayer::new(tracer));

    if subscriber.try_init().is_ok() {
        opentelemetry::global::set_tracer_provider(provider);
        tracing::info!(level, "tracing initialized");
    }
}
