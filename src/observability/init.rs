//! Tracing initialization and subscriber setup.

use crate::ShellConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor `trace_level` is set.
const DEFAULT_LEVEL: &str = "info";

/// Filter directive derived from configuration, ignoring `RUST_LOG`.
///
/// # Example
///
/// ```rust
/// use pageshell::observability::filter_directive;
/// use pageshell::ShellConfig;
///
/// assert_eq!(filter_directive(&ShellConfig::default()), "info");
///
/// let config = ShellConfig { trace_level: Some(" debug ".into()), ..Default::default() };
/// assert_eq!(filter_directive(&config), "debug");
/// ```
#[must_use]
pub fn filter_directive(config: &ShellConfig) -> String {
    config
        .trace_level
        .as_deref()
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` or the
/// configured trace level.
///
/// # Initialization Behavior
///
/// - `RUST_LOG` wins over `config.trace_level` when set and valid
/// - Idempotent: only the first call installs a subscriber; later calls, or
///   calls after the embedder installed its own, return `false`
///
/// # Returns
///
/// `true` if this call installed the subscriber.
pub fn init_tracing(config: &ShellConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("tracing subscriber installed");
    }
    installed
}
