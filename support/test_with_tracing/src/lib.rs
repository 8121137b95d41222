// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Crate for defining unit tests whose `tracing` output should be visible.
//!
//! Annotate a test with `#[test_with_tracing::test]` instead of `#[test]`.
//! Events are routed through the libtest capture writer, so they only show up
//! for failing tests (or with `--nocapture`).

#[cfg(test)]
extern crate self as test_with_tracing;

pub use test_with_tracing_macro::test;
use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber for tests. Only the first call has any
/// effect.
///
/// `RUST_LOG` is parsed as a list of `target=level` directives; an
/// unparsable value falls back to the default of DEBUG for every target.
#[doc(hidden)]
pub fn init() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        let targets = std::env::var("RUST_LOG")
            .ok()
            .and_then(|var| var.parse::<Targets>().ok())
            .unwrap_or_else(|| Targets::new().with_default(LevelFilter::DEBUG));

        // Another harness may already own the global default.
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_ansi(false)
                    .with_test_writer(),
            )
            .with(targets)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::test;

    #[test]
    fn emits_events() {
        tracing::debug!(answer = 42, "structured event");
        tracing::warn!("warning event");
    }

    #[test]
    fn returns_result() -> Result<(), Box<dyn std::error::Error>> {
        let n: u16 = "31".parse()?;
        tracing::info!(n, "ok");
        Ok(())
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn forwards_attributes() {
        panic!("boom");
    }
}
