//! Log setup. Everything goes to stderr so stdout stays parseable.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter preset for a verbosity level; `RUST_LOG` takes precedence.
fn preset(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        // warnings only
        0 => "warn",
        // our info logging
        1 => "warn,picoforge=info,picoforge_core=info",
        // our debug logging, everything else info
        2 => "info,picoforge=debug,picoforge_core=debug",
        // everything gets trace
        _ => "trace",
    }
}

pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(preset(verbose, quiet)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_parse() {
        for verbose in 0..5 {
            assert!(EnvFilter::try_new(preset(verbose, false)).is_ok());
        }
        assert_eq!(preset(3, true), "error");
    }
}
