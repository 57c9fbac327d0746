use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used, falling back to
/// `info` if it does not parse. Logs go to stderr so they never interleave
/// with chat output.
pub fn init(level: &str, json: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(level),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn build_filter(level: &str) -> EnvFilter {
    match level.parse::<EnvFilter>() {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!(
                "WARN: SAATHI_LOG='{}' is not a valid tracing filter ({}); falling back to 'info'",
                level, e
            );
            EnvFilter::new("info")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_valid_filter_is_kept() {
        let filter = build_filter("saathi_client=debug,warn");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_invalid_filter_falls_back_to_info() {
        let filter = build_filter("saathi_client=loud");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
