//! The two locales the site is published in.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported site locale.
///
/// The canonical tags are the ones persisted and written to the root
/// element's `lang` attribute: `en` and `pt-pt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-pt")]
    PtPt,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::PtPt];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtPt => "pt-pt",
        }
    }

    /// Two-letter label shown on a language toggle.
    pub fn short_label(self) -> &'static str {
        match self {
            Locale::En => "EN",
            Locale::PtPt => "PT",
        }
    }

    pub fn other(self) -> Locale {
        match self {
            Locale::En => Locale::PtPt,
            Locale::PtPt => Locale::En,
        }
    }

    /// Resolve a BCP 47 tag to a supported locale.
    ///
    /// Only the canonical tags match, in any letter case: `en` and `pt-PT`.
    /// Other regions, bare `pt`, scripts, variants and extensions are
    /// unsupported and return `None`, as do malformed tags.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let parsed: icu_locale::Locale = tag.trim().parse().ok()?;
        let id = &parsed.id;
        if id.script.is_some() || !id.variants.is_empty() || !parsed.extensions.is_empty() {
            return None;
        }
        match (id.language.as_str(), id.region.as_ref().map(|region| region.as_str())) {
            ("en", None) => Some(Locale::En),
            ("pt", Some("PT")) => Some(Locale::PtPt),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocale(pub String);

impl fmt::Display for UnknownLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale '{}'", self.0)
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| UnknownLocale(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_codes() {
        assert_eq!(Locale::En.code(), "en");
        assert_eq!(Locale::PtPt.code(), "pt-pt");
        assert_eq!(Locale::PtPt.to_string(), "pt-pt");
    }

    #[test]
    fn test_from_tag_variants() {
        assert_eq!(Locale::from_tag("en"), Some(Locale::En));
        assert_eq!(Locale::from_tag("EN"), Some(Locale::En));
        assert_eq!(Locale::from_tag("pt-pt"), Some(Locale::PtPt));
        assert_eq!(Locale::from_tag("pt-PT"), Some(Locale::PtPt));
        assert_eq!(Locale::from_tag(" pt-PT "), Some(Locale::PtPt));
    }

    #[test]
    fn test_from_tag_rejects_other_regions() {
        assert_eq!(Locale::from_tag("pt"), None);
        assert_eq!(Locale::from_tag("pt-BR"), None);
        assert_eq!(Locale::from_tag("pt-AO"), None);
        assert_eq!(Locale::from_tag("en-US"), None);
        assert_eq!(Locale::from_tag("en-GB"), None);
        assert_eq!(Locale::from_tag("pt-Latn-PT"), None);
    }

    #[test]
    fn test_from_tag_rejects_unknown() {
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
        assert_eq!(Locale::from_tag("not a tag"), None);
        assert!("de-AT".parse::<Locale>().is_err());
    }

    #[test]
    fn test_other_and_labels() {
        assert_eq!(Locale::En.other(), Locale::PtPt);
        assert_eq!(Locale::PtPt.other(), Locale::En);
        assert_eq!(Locale::En.short_label(), "EN");
        assert_eq!(Locale::PtPt.short_label(), "PT");
    }

    #[test]
    fn test_serde_uses_canonical_codes() {
        assert_eq!(serde_json::to_string(&Locale::PtPt).unwrap(), "\"pt-pt\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::En);
    }
}
