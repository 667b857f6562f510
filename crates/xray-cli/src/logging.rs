//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a verbosity level, used when `RUST_LOG` is unset.
pub fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!(
        "warn,xray_cli={level},xray_client={level},xray_models={level}",
        level = level
    )
}

/// Initialize tracing: colored output for interactive use, JSON when
/// `LOG_FORMAT=json`. Logs go to stderr so stdout carries only results.
pub fn init(verbosity: u8) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert!(default_directives(0).contains("xray_client=info"));
        assert!(default_directives(1).contains("xray_cli=debug"));
        assert!(default_directives(5).contains("xray_models=trace"));
        assert!(default_directives(0).starts_with("warn,"));
    }

    #[test]
    fn test_directives_parse() {
        for v in 0..3 {
            assert!(default_directives(v)
                .split(',')
                .all(|d| d.parse::<tracing_subscriber::filter::Directive>().is_ok()));
        }
    }
}
