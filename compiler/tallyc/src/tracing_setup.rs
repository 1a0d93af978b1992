//! Tracing initialisation for the binary and for embedders.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a global subscriber when `TALLY_LOG` is set.
///
/// Safe to call more than once. `TALLY_LOG` takes `EnvFilter` syntax,
/// e.g. `TALLY_LOG=tally_parse=debug` or `TALLY_LOG=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("TALLY_LOG").is_ok() {
            let filter = EnvFilter::from_env("TALLY_LOG");
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
