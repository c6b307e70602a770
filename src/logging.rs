//! Log filtering shared by the binaries.
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "modelsmith=info";


/// The filter built from `RUST_LOG`.
pub fn env_filter() -> EnvFilter {
    env_filter_from(std::env::var("RUST_LOG").ok().as_deref())
}


/// The filter built from the given directives,
/// or [`DEFAULT_DIRECTIVE`] if they are absent or do not parse.
pub fn env_filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|text| !text.trim().is_empty())
        .and_then(|text| EnvFilter::try_new(text).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}


#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn user_directives_win() {
        let filter = env_filter_from(Some("modelsmith=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }


    #[test]
    fn default_is_info() {
        for value in [None, Some(""), Some("modelsmith=loud")] {
            let filter = env_filter_from(value);
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO), "{value:?}");
        }
    }
}
