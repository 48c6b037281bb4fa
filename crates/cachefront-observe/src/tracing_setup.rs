//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! // Structured logging at the given filter level
//! cachefront_observe::tracing_setup::init_tracing("warn", false, false).unwrap();
//!
//! // JSON logs with OpenTelemetry export to stdout (for local development)
//! cachefront_observe::tracing_setup::init_tracing("debug", true, true).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer (human-readable, or JSON lines when `json` is
///   true) with span close timing.
/// - `filter` is the default directive; `RUST_LOG` overrides it when set.
/// - When `enable_otel` is true, additionally bridges tracing spans to
///   OpenTelemetry using a stdout exporter (suitable for local development;
///   swap the exporter for OTLP in production).
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the OTel pipeline fails to initialize.
pub fn init_tracing(
    filter: &str,
    json: bool,
    enable_otel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE);
    // Logs go to stderr so command output (tables, URLs, JSON) on stdout
    // stays machine-consumable.
    let fmt_layer = fmt_layer.with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(env_filter);

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("cachefront");

        // Store the provider for shutdown and register it globally.
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        // The OTel layer is generic over the subscriber it stacks onto, and
        // the JSON and plain fmt layers produce different subscriber types,
        // so each branch needs its own instance.
        if json {
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            registry.with(fmt_layer.json()).with(otel_layer).init();
        } else {
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            registry.with(fmt_layer).with(otel_layer).init();
        }
    } else if json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Call this before process exit to ensure all buffered spans are exported.
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
