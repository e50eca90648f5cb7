pub mod core;

use tracing_subscriber::EnvFilter;

/// Install the structured logging subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,patchwork_lib=debug")),
        )
        .try_init();
}
