use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber on stderr. `RUST_LOG` wins over `fallback`.
pub fn init(fallback: &str) {
    let filter = filter_from(std::env::var("RUST_LOG").ok().as_deref(), fallback);
    // A subscriber may already be installed when the CLI opens the viewer.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn filter_from(rust_log: Option<&str>, fallback: &str) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

#[cfg(test)]
mod tests {
    use super::filter_from;

    #[test]
    fn rust_log_overrides_fallback() {
        let filter = filter_from(Some("slide_explorer=trace"), "warn");
        assert_eq!(filter.to_string(), "slide_explorer=trace");
    }

    #[test]
    fn unset_or_blank_rust_log_uses_fallback() {
        assert_eq!(filter_from(None, "debug").to_string(), "debug");
        assert_eq!(filter_from(Some("  "), "warn").to_string(), "warn");
    }
}
