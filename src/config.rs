/// Session configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Draw empty dark squares as `##`.
    pub checkered_tiles: bool,
    /// Print the rejection reason after an illegal move.
    pub show_reasons: bool,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            log_filter: lookup("CHESS_LOG").unwrap_or(defaults.log_filter),
            checkered_tiles: lookup("CHESS_CHECKERED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.checkered_tiles),
            show_reasons: lookup("CHESS_SHOW_REASONS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.show_reasons),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_filter: "chess_arbiter=warn".to_string(),
            checkered_tiles: true,
            show_reasons: false,
        }
    }
}

/// `0`, `false`, `no` and `off` (any case) are false; everything else is true.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_filter, "chess_arbiter=warn");
        assert!(config.checkered_tiles);
        assert!(!config.show_reasons);
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.log_filter, "chess_arbiter=warn");
        assert!(config.checkered_tiles);
        assert!(!config.show_reasons);
    }

    #[test]
    fn lookup_overrides() {
        let config = AppConfig::from_lookup(|key| match key {
            "CHESS_LOG" => Some("chess_arbiter=debug".into()),
            "CHESS_CHECKERED" => Some("No".into()),
            "CHESS_SHOW_REASONS" => Some("1".into()),
            _ => None,
        });
        assert_eq!(config.log_filter, "chess_arbiter=debug");
        assert!(!config.checkered_tiles);
        assert!(config.show_reasons);
    }

    #[test]
    fn flag_parsing() {
        assert!(!parse_flag("0"));
        assert!(!parse_flag(" FALSE "));
        assert!(!parse_flag("off"));
        assert!(parse_flag("yes"));
        assert!(parse_flag("1"));
    }
}
