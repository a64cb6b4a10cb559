//! Environment-driven logging settings.
//!
//! - `RUST_LOG`: filter directives (default `info`)
//! - `SERVICEDESK_LOG_FORMAT`: `json` (default) or `pretty`

use core::str::FromStr;

pub const LOG_FORMAT_VAR: &str = "SERVICEDESK_LOG_FORMAT";
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub format: LogFormat,
    /// Rejected `SERVICEDESK_LOG_FORMAT` value, reported once logging is up.
    pub rejected_format: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_format_var(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
    }

    fn from_format_var(value: Option<&str>) -> Self {
        match value.map(LogFormat::from_str) {
            None => Self {
                format: LogFormat::default(),
                rejected_format: None,
            },
            Some(Ok(format)) => Self {
                format,
                rejected_format: None,
            },
            Some(Err(_)) => Self {
                format: LogFormat::default(),
                rejected_format: value.map(str::to_string),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_json() {
        let config = ObservabilityConfig::from_format_var(None);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.rejected_format, None);
    }

    #[test]
    fn parses_known_formats_case_insensitively() {
        assert_eq!(
            ObservabilityConfig::from_format_var(Some("Pretty")).format,
            LogFormat::Pretty
        );
        assert_eq!(
            ObservabilityConfig::from_format_var(Some(" json ")).format,
            LogFormat::Json
        );
    }

    #[test]
    fn unknown_format_falls_back_and_is_remembered() {
        let config = ObservabilityConfig::from_format_var(Some("xml"));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.rejected_format.as_deref(), Some("xml"));
    }
}
