use crate::LocalizedMessages;
use crate::error::{LoadError, LoadResult};
use crate::locale::Locale;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

static MESSAGE_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

/// Whether `key` is a well-formed dotted message key such as `nav.home`
/// or `services.core.ai.point1`.
pub fn is_valid_message_key(key: &str) -> bool {
    let re = MESSAGE_KEY_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("message key pattern is valid")
    });
    re.is_match(key)
}

/// Parse messages from JSON text
///
/// The JSON should have the following structure:
/// ```json
/// {
///     "@metadata": { ... },  // Ignored
///     "nav.home": "Home",
///     "hero.slide2.heading": "Expert <span class=\"gradient-text\">Web Development</span>"
/// }
/// ```
///
/// Non-string values and malformed keys are skipped with a warning.
/// `origin` names the source in errors and log lines.
pub fn load_messages_from_str(origin: &str, content: &str) -> LoadResult<LocalizedMessages> {
    let json: Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
        origin: origin.to_string(),
        source,
    })?;

    let obj = json
        .as_object()
        .ok_or_else(|| LoadError::NotAnObject(origin.to_string()))?;

    let mut messages = LocalizedMessages::new();
    for (key, value) in obj {
        // Skip metadata
        if key.starts_with('@') {
            continue;
        }

        if !is_valid_message_key(key) {
            warn!(origin, key = %key, "skipping malformed message key");
            continue;
        }

        if let Some(message) = value.as_str() {
            messages.with_message(key, message);
        } else {
            warn!(origin, key = %key, "message is not a string, skipping");
        }
    }

    Ok(messages)
}

/// Load messages from a single JSON file
pub fn load_messages_from_file(path: &Path) -> LoadResult<LocalizedMessages> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_messages_from_str(&path.display().to_string(), &content)
}

/// Load all messages from a directory of JSON files
///
/// The filename (without extension) is the locale tag: `en.json` -> `en`,
/// `pt-pt.json` -> `pt-pt`. Files for unsupported locales are skipped.
pub fn load_all_messages_from_dir(dir: &Path) -> LoadResult<HashMap<Locale, LocalizedMessages>> {
    if !dir.exists() {
        return Err(LoadError::DirectoryNotFound(dir.to_path_buf()));
    }

    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let mut all_messages = HashMap::new();

    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();

        // Only process JSON files
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| LoadError::InvalidFilename(path.clone()))?;

        let Some(locale) = Locale::from_tag(stem) else {
            warn!(file = %path.display(), "no supported locale for file, skipping");
            continue;
        };

        let messages = load_messages_from_file(&path)?;
        all_messages.insert(locale, messages);
    }

    if all_messages.is_empty() {
        warn!(dir = %dir.display(), "no message files found");
    }

    Ok(all_messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_message_key_validation() {
        assert!(is_valid_message_key("nav.home"));
        assert!(is_valid_message_key("services.core.ai.point1"));
        assert!(is_valid_message_key("form.option.e-commerce"));
        assert!(is_valid_message_key("hero.slide2.ctaPrimary"));
        assert!(!is_valid_message_key(""));
        assert!(!is_valid_message_key("nav..home"));
        assert!(!is_valid_message_key(".nav"));
        assert!(!is_valid_message_key("nav home"));
    }

    #[test]
    fn test_load_from_str_skips_metadata_and_non_strings() {
        let json = r#"{
            "@metadata": {"authors": ["someone"]},
            "nav.home": "Home",
            "nav.count": 3,
            "bad key": "x"
        }"#;
        let messages = load_messages_from_str("inline", json).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages.get_message("nav.home").map(String::as_str), Some("Home"));
    }

    #[test]
    fn test_load_from_str_rejects_non_object() {
        let err = load_messages_from_str("inline", "[1, 2]").unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject(_)));

        let err = load_messages_from_str("inline", "{").unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn test_load_all_messages_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut en = fs::File::create(dir.path().join("en.json")).unwrap();
        writeln!(en, r#"{{"nav.home": "Home"}}"#).unwrap();
        let mut pt = fs::File::create(dir.path().join("pt-pt.json")).unwrap();
        writeln!(pt, r#"{{"nav.home": "Início"}}"#).unwrap();
        let mut fr = fs::File::create(dir.path().join("fr.json")).unwrap();
        writeln!(fr, r#"{{"nav.home": "Accueil"}}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let all = load_all_messages_from_dir(dir.path()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[&Locale::PtPt].get_message("nav.home").map(String::as_str),
            Some("Início")
        );
    }

    #[test]
    fn test_load_all_messages_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = load_all_messages_from_dir(&missing).unwrap_err();
        assert!(matches!(err, LoadError::DirectoryNotFound(_)));
    }
}
