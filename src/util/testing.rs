use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::RawNodeRecord;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let noisy_modules = ["config"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Three-level fixture: root splits into an internal node `A` and leaf `C`,
/// `A` splits into leaves `B` and `D`.
///
/// ```text
/// 1 root (0.5)
/// ├── 2 A (0.8)
/// │   ├── 4 B 3/1
/// │   └── 5 D 0/0
/// └── 3 C 7/3
/// ```
pub fn sample_records() -> Vec<RawNodeRecord> {
    vec![
        RawNodeRecord::internal(1, "root", 2, 3, 0.5),
        RawNodeRecord::internal(2, "A", 4, 5, 0.8),
        RawNodeRecord::leaf(3, "C", 7, 3),
        RawNodeRecord::leaf(4, "B", 3, 1),
        RawNodeRecord::leaf(5, "D", 0, 0),
    ]
}

/// Complete binary tree of the given depth, numbered heap-style from 1.
pub fn complete_records(depth: u32) -> Vec<RawNodeRecord> {
    let internal = (1_i64 << depth) - 1;
    let total = (1_i64 << (depth + 1)) - 1;
    (1..=total)
        .map(|n| {
            if n <= internal {
                RawNodeRecord::internal(n, &format!("n{n}"), 2 * n, 2 * n + 1, n as f64 / 10.0)
            } else {
                RawNodeRecord::leaf(n, &format!("n{n}"), n as u64, 1)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn test_complete_records_counts() {
        let records = complete_records(3);
        assert_eq!(records.len(), 15);
        assert_eq!(records.iter().filter(|r| r.is_leaf()).count(), 8);
    }
}
