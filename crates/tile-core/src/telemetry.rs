//! Logging setup for `tile-publish`.
//!
//! The binary prints its outcome (published, skipped) on stdout, so every log
//! line goes to stderr. CI runners that ship logs elsewhere can ask for one
//! JSON object per event; each carries the `root` field of the enclosing
//! `tile.publish` span, which keeps runs over several tiles apart.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose debug output is about HTTP plumbing rather than the tile.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Install the global subscriber for a publish run.
///
/// `level` applies when `RUST_LOG` is unset; `--verbose` maps to `DEBUG`.
/// `RUST_LOG` replaces the default entirely, HTTP crates included. Only the
/// first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.ok();
}

/// Filter used without `RUST_LOG`: `level` everywhere, HTTP crates at warn.
fn default_filter(level: Level) -> EnvFilter {
    let mut directives = vec![level.as_str().to_string()];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|c| format!("{}=warn", c)));
    EnvFilter::new(directives.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_http_crates() {
        let filter = default_filter(Level::DEBUG).to_string();
        for krate in QUIET_DEPENDENCIES {
            assert!(
                filter.contains(&format!("{}=warn", krate)),
                "{} missing from {}",
                krate,
                filter
            );
        }
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!("still logging");
    }
}
