//! Site settings: timings, offsets and thresholds, with environment
//! overrides.
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::storage::FileStore;

pub const DEFAULT_RECIPIENT: &str = "info@clientfirstdigital.com";

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    // Carousel
    pub carousel_interval: Duration,

    // Theme
    pub theme_transition: Duration,
    pub navbar_scroll_threshold: f64,

    // Navigation
    pub anchor_offset: f64,
    pub page_transition: Duration,

    // Scroll reveal
    pub reveal_threshold: f64,
    pub reveal_bottom_margin: f64,

    // Contact form
    pub contact_recipient: String,
    pub submit_feedback: Duration,

    // Card effects
    pub touch_pan_reset: Duration,

    /// File backing the preference store; `None` keeps preferences in
    /// memory for the session.
    pub preferences_path: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            carousel_interval: Duration::from_secs(5),
            theme_transition: Duration::from_millis(300),
            navbar_scroll_threshold: 50.0,
            anchor_offset: 80.0,
            page_transition: Duration::from_millis(300),
            reveal_threshold: 0.1,
            reveal_bottom_margin: 50.0,
            contact_recipient: DEFAULT_RECIPIENT.to_string(),
            submit_feedback: Duration::from_millis(1500),
            touch_pan_reset: Duration::from_millis(2000),
            preferences_path: FileStore::default_path(),
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from defaults, overriding any `CLIENTFIRST_*` variable that
    /// `lookup` returns. Set-but-malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SiteConfig::default();
        let millis = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            Ok(parse_var::<u64>(&lookup, var, "milliseconds")?.map_or(default, Duration::from_millis))
        };
        let number = |var: &'static str, default: f64| -> Result<f64, ConfigError> {
            Ok(parse_var::<f64>(&lookup, var, "a number")?.unwrap_or(default))
        };

        Ok(SiteConfig {
            carousel_interval: millis("CLIENTFIRST_CAROUSEL_INTERVAL_MS", defaults.carousel_interval)?,
            theme_transition: millis("CLIENTFIRST_THEME_TRANSITION_MS", defaults.theme_transition)?,
            navbar_scroll_threshold: number("CLIENTFIRST_NAVBAR_THRESHOLD", defaults.navbar_scroll_threshold)?,
            anchor_offset: number("CLIENTFIRST_ANCHOR_OFFSET", defaults.anchor_offset)?,
            page_transition: millis("CLIENTFIRST_PAGE_TRANSITION_MS", defaults.page_transition)?,
            reveal_threshold: number("CLIENTFIRST_REVEAL_THRESHOLD", defaults.reveal_threshold)?,
            reveal_bottom_margin: number("CLIENTFIRST_REVEAL_MARGIN", defaults.reveal_bottom_margin)?,
            contact_recipient: lookup("CLIENTFIRST_CONTACT_RECIPIENT").unwrap_or(defaults.contact_recipient),
            submit_feedback: millis("CLIENTFIRST_SUBMIT_FEEDBACK_MS", defaults.submit_feedback)?,
            touch_pan_reset: millis("CLIENTFIRST_TOUCH_RESET_MS", defaults.touch_pan_reset)?,
            preferences_path: lookup("CLIENTFIRST_STATE_PATH")
                .map(PathBuf::from)
                .or(defaults.preferences_path),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>().ok();
    match parsed {
        Some(parsed) => Ok(Some(parsed)),
        None => Err(ConfigError::Invalid { var, value, expected }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SiteConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.carousel_interval, Duration::from_secs(5));
        assert_eq!(config.theme_transition, Duration::from_millis(300));
        assert_eq!(config.anchor_offset, 80.0);
        assert_eq!(config.reveal_threshold, 0.1);
        assert_eq!(config.contact_recipient, DEFAULT_RECIPIENT);
        assert_eq!(config.submit_feedback, Duration::from_millis(1500));
    }

    #[test]
    fn test_overrides() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("CLIENTFIRST_CAROUSEL_INTERVAL_MS", "2500"),
            ("CLIENTFIRST_ANCHOR_OFFSET", " 64 "),
            ("CLIENTFIRST_CONTACT_RECIPIENT", "hello@example.pt"),
            ("CLIENTFIRST_STATE_PATH", "/tmp/prefs.json"),
        ]))
        .unwrap();
        assert_eq!(config.carousel_interval, Duration::from_millis(2500));
        assert_eq!(config.anchor_offset, 64.0);
        assert_eq!(config.contact_recipient, "hello@example.pt");
        assert_eq!(config.preferences_path, Some(PathBuf::from("/tmp/prefs.json")));
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = SiteConfig::from_lookup(lookup(&[("CLIENTFIRST_THEME_TRANSITION_MS", "fast")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "CLIENTFIRST_THEME_TRANSITION_MS",
                ..
            }
        ));
    }
}
