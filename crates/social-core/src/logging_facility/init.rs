//! Logging initialization

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile for the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    /// Human-readable output, debug level for the social crates
    Development,
    /// JSON lines, info level
    Production,
    /// No output; tests install a capture layer instead
    Test,
}

impl std::str::FromStr for LogProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" | "text" => Ok(LogProfile::Development),
            "prod" | "production" | "json" => Ok(LogProfile::Production),
            "test" => Ok(LogProfile::Test),
            other => Err(format!("unknown log profile '{}'", other)),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber; later calls are no-ops
///
/// `RUST_LOG` overrides the profile's default filter.
pub fn init(profile: LogProfile) {
    INIT_ONCE.call_once(|| match profile {
        LogProfile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("social=debug,warn")),
                )
                .init();
        }
        LogProfile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("social=info,warn")),
                )
                .init();
        }
        LogProfile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}
