use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> String {
    if verbose {
        "venturegrid=debug,venturegrid_engine=debug,venturegrid_finance=debug".to_string()
    } else {
        "venturegrid=info,venturegrid_engine=warn,venturegrid_finance=warn".to_string()
    }
}

/// Initialize logging to stderr, leaving stdout for command output.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .init();
}
