//! Log setup for the `ragchunk` binary.
//!
//! `RUST_LOG` takes precedence; otherwise the filter is built from the
//! `[logging]` table:
//!
//! ```toml
//! [logging]
//! default = "warn"
//!
//! [logging.modules]
//! ragchunk_split = "debug"
//! ```

use std::sync::Once;

use ragchunk_core::config::LoggingSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Install the global subscriber. Only the first call has an effect.
pub fn init_with_config(config: &LoggingSettings) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };
        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);
        // A test harness may already have installed a subscriber.
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

pub fn init() { init_with_config(&LoggingSettings::default()); }

/// `default[,module=level...]`
pub fn filter_directives(config: &LoggingSettings) -> String {
    let mut directives = config.default.clone();
    for (module, level) in &config.modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}
