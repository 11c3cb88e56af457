use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use tracing::error;

use crate::error::LoadResult;
use crate::loader::{load_all_messages_from_dir, load_messages_from_str};
use crate::locale::Locale;

/// Flat mapping of message key to message value for one locale.
///
/// Values may carry inline markup (e.g. a `<span class="gradient-text">`
/// highlight); whether they are inserted as markup is decided by the
/// element they are bound to, not by the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedMessages(pub HashMap<String, String>);

impl LocalizedMessages {
    pub fn new() -> Self {
        LocalizedMessages(HashMap::new())
    }
    pub fn with_message(&mut self, key: &str, message: &str) -> &mut Self {
        self.0.insert(key.to_owned(), message.to_owned());
        self
    }
    pub fn get_message(&self, key: &str) -> Option<&String> {
        self.0.get(key)
    }
    pub fn get_messages(&self) -> &HashMap<String, String> {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A key present in some locale but missing from `locale`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MissingKey {
    pub locale: Locale,
    pub key: String,
}

/// Result of comparing key sets across locales
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymmetryReport {
    /// Sorted by locale, then key
    pub missing: Vec<MissingKey>,
}

impl SymmetryReport {
    pub fn is_symmetric(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Messages for every supported locale.
///
/// Keyed by locale and then by message key
/// e.g. messages[en]["nav.home"] = "Home"
///      messages[pt-pt]["nav.home"] = "Início"
///
/// Lookups never fall back to another locale: a key missing from the
/// requested locale is simply absent.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    messages: HashMap<Locale, LocalizedMessages>,
}

const EMBEDDED: [(Locale, &str, &str); 2] = [
    (Locale::En, "i18n/en.json", include_str!("../i18n/en.json")),
    (Locale::PtPt, "i18n/pt-pt.json", include_str!("../i18n/pt-pt.json")),
];

static BUILTIN: LazyLock<Arc<Dictionary>> = LazyLock::new(|| Arc::new(Dictionary::from_embedded()));

impl Dictionary {
    pub fn new() -> Self {
        Dictionary {
            messages: HashMap::new(),
        }
    }

    /// The compiled-in site dictionary, parsed on first use.
    pub fn builtin() -> Arc<Dictionary> {
        Arc::clone(&BUILTIN)
    }

    fn from_embedded() -> Self {
        let mut dictionary = Dictionary::new();
        for (locale, origin, content) in EMBEDDED {
            match load_messages_from_str(origin, content) {
                Ok(messages) => {
                    dictionary.with_messages_for_locale(locale, messages);
                }
                Err(err) => error!(%locale, %err, "embedded dictionary failed to load"),
            }
        }
        dictionary
    }

    /// Load `<locale>.json` files from `dir`, e.g. a translator's working
    /// copy of `i18n/`.
    pub fn from_dir(dir: &Path) -> LoadResult<Self> {
        Ok(Dictionary {
            messages: load_all_messages_from_dir(dir)?,
        })
    }

    pub fn with_messages_for_locale(
        &mut self,
        locale: Locale,
        messages: LocalizedMessages,
    ) -> &mut Self {
        self.messages.insert(locale, messages);
        self
    }

    pub fn add_message(&mut self, locale: Locale, key: &str, message: &str) {
        self.messages
            .entry(locale)
            .or_insert_with(LocalizedMessages::new)
            .with_message(key, message);
    }

    pub fn messages_for(&self, locale: Locale) -> Option<&LocalizedMessages> {
        self.messages.get(&locale)
    }

    pub fn get_message(&self, locale: Locale, key: &str) -> Option<&str> {
        self.messages
            .get(&locale)
            .and_then(|messages| messages.get_message(key))
            .map(String::as_str)
    }

    /// Locales with a loaded mapping, in canonical order
    pub fn locales(&self) -> Vec<Locale> {
        Locale::ALL
            .into_iter()
            .filter(|locale| self.messages.contains_key(locale))
            .collect()
    }

    /// Every supported locale must carry the same key set.
    pub fn check_symmetry(&self) -> SymmetryReport {
        let all_keys: BTreeSet<&str> = self
            .messages
            .values()
            .flat_map(|messages| messages.keys())
            .collect();

        let mut missing = Vec::new();
        for locale in Locale::ALL {
            let present = self.messages.get(&locale);
            for key in &all_keys {
                if present.is_none_or(|messages| messages.get_message(key).is_none()) {
                    missing.push(MissingKey {
                        locale,
                        key: (*key).to_string(),
                    });
                }
            }
        }
        SymmetryReport { missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dictionary_is_symmetric() {
        let dictionary = Dictionary::builtin();
        let report = dictionary.check_symmetry();
        assert!(report.is_symmetric(), "missing keys: {:?}", report.missing);
        assert_eq!(dictionary.locales(), vec![Locale::En, Locale::PtPt]);
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"nav.home": "Home", "nav.cta": "Talk"}"#).unwrap();
        std::fs::write(dir.path().join("pt-pt.json"), r#"{"nav.home": "Início"}"#).unwrap();

        let dictionary = Dictionary::from_dir(dir.path()).unwrap();
        assert_eq!(dictionary.get_message(Locale::PtPt, "nav.home"), Some("Início"));
        let report = dictionary.check_symmetry();
        assert_eq!(
            report.missing,
            vec![MissingKey {
                locale: Locale::PtPt,
                key: "nav.cta".to_string(),
            }]
        );
    }

    #[test]
    fn test_builtin_lookups() {
        let dictionary = Dictionary::builtin();
        assert_eq!(dictionary.get_message(Locale::En, "nav.home"), Some("Home"));
        assert_eq!(dictionary.get_message(Locale::PtPt, "nav.home"), Some("Início"));
        assert_eq!(
            dictionary.get_message(Locale::PtPt, "form.namePlaceholder"),
            Some("O Seu Nome")
        );
        assert!(
            dictionary
                .get_message(Locale::En, "hero.slide2.heading")
                .is_some_and(|value| value.contains("<span class=\"gradient-text\">"))
        );
        assert_eq!(dictionary.messages_for(Locale::En).map(LocalizedMessages::len), Some(332));
    }

    #[test]
    fn test_no_fallback_between_locales() {
        let mut dictionary = Dictionary::new();
        dictionary.add_message(Locale::En, "only.en", "English only");
        assert_eq!(dictionary.get_message(Locale::PtPt, "only.en"), None);
        assert_eq!(dictionary.get_message(Locale::En, "missing"), None);
    }

    #[test]
    fn test_symmetry_report_lists_missing_keys() {
        let mut dictionary = Dictionary::new();
        dictionary.add_message(Locale::En, "a", "Hi");
        dictionary.add_message(Locale::En, "b", "Bye");
        dictionary.add_message(Locale::PtPt, "a", "Olá");
        dictionary.add_message(Locale::PtPt, "c", "Extra");

        let report = dictionary.check_symmetry();
        assert!(!report.is_symmetric());
        assert_eq!(
            report.missing,
            vec![
                MissingKey { locale: Locale::En, key: "c".to_string() },
                MissingKey { locale: Locale::PtPt, key: "b".to_string() },
            ]
        );
    }

    #[test]
    fn test_missing_locale_reports_every_key() {
        let mut dictionary = Dictionary::new();
        dictionary.add_message(Locale::En, "a", "Hi");
        let report = dictionary.check_symmetry();
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].locale, Locale::PtPt);
    }
}
