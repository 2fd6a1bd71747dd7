//! Structured logging setup

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence when set. Otherwise synthcast crates log at
/// `info`, or `debug` when `debug` is true. Returns false when a subscriber
/// was already installed.
pub fn init_logging(debug: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(false)
        .try_init()
        .is_ok()
}

fn filter(debug: bool) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::builder().from_env_lossy()
    } else {
        let level = if debug { "debug" } else { "info" };
        EnvFilter::builder().parse_lossy(format!(
            "synthcast={level},synthcast_core={level},synthcast_media={level}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logging(true);
        assert!(!init_logging(false));
    }
}
