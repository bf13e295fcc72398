//! Logging setup for the `hcledit` binary.
//!
//! Filter priority:
//!
//! 1. **`HCLEDIT_LOG`**: a bare level (`debug`) applies to this crate only;
//!    anything with `=` or `,` is used as a full filter.
//! 2. **`RUST_LOG`**: used as-is.
//! 3. **Default**: `warn`, or `warn,hcledit=debug` with `--verbose`.
//!
//! Output goes to stderr so command output on stdout stays clean.

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = fmt()
        .with_env_filter(create_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn create_filter(verbose: bool) -> EnvFilter {
    if let Ok(level) = env::var("HCLEDIT_LOG") {
        return expand_hcledit_log(&level);
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    if verbose {
        EnvFilter::new("warn,hcledit=debug")
    } else {
        EnvFilter::new("warn")
    }
}

fn expand_hcledit_log(level: &str) -> EnvFilter {
    if level.contains('=') || level.contains(',') {
        return EnvFilter::new(level);
    }
    EnvFilter::new(format!("warn,hcledit={level}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_crate() {
        let scoped = expand_hcledit_log("trace").to_string();
        assert!(scoped.contains("hcledit=trace"), "{scoped}");
        assert!(scoped.contains("warn"), "{scoped}");

        let explicit = expand_hcledit_log("hcledit::syntax=trace").to_string();
        assert!(!explicit.contains("warn"), "{explicit}");
    }
}
