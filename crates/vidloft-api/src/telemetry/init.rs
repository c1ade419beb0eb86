use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "vidloft=debug,tower_http=debug";

fn json_requested() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialize tracing: `RUST_LOG` filter, compact console output or JSON lines
/// when `LOG_FORMAT=json`.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    let json = json_requested();

    let console_fmt = (!json).then(|| {
        tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        )
    });
    let json_fmt = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(console_fmt)
        .with(json_fmt)
        .try_init()?;

    tracing::info!(json, "Tracing initialized");
    Ok(())
}
