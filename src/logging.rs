use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured `log_level` is used.
/// Safe to call more than once; later calls are no-ops.
pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = AppConfig::default();
        init(&config);
        init(&config);
    }
}
