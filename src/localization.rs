use std::sync::Arc;

use tracing::debug;

use crate::bindings::TranslationBindings;
use crate::dictionary::Dictionary;
use crate::dom::{Document, NodeId};
use crate::locale::Locale;
use crate::storage::Preferences;

pub const LANGUAGE_TOGGLE_CLASS: &str = "language-toggle";

/// Applies dictionary messages to the bound elements of one document.
pub struct Localizer {
    dictionary: Arc<Dictionary>,
    bindings: TranslationBindings,
    toggles: Vec<NodeId>,
}

impl Localizer {
    pub fn new(doc: &Document, dictionary: Arc<Dictionary>) -> Self {
        Localizer {
            dictionary,
            bindings: TranslationBindings::scan(doc),
            toggles: doc.query_class(LANGUAGE_TOGGLE_CLASS),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn bindings(&self) -> &TranslationBindings {
        &self.bindings
    }

    /// Rewrite bound elements for the locale named by `tag`.
    ///
    /// Unknown tags and locales without a loaded mapping are ignored and
    /// return `None`; the document is left as it was.
    pub fn apply_locale(&self, doc: &mut Document, tag: &str) -> Option<Locale> {
        let Some(locale) = Locale::from_tag(tag) else {
            debug!(tag, "ignoring unsupported locale");
            return None;
        };
        self.apply(doc, locale).then_some(locale)
    }

    /// Rewrite bound elements for `locale`; false when it has no mapping.
    pub fn apply(&self, doc: &mut Document, locale: Locale) -> bool {
        let Some(messages) = self.dictionary.messages_for(locale) else {
            debug!(%locale, "no messages loaded for locale");
            return false;
        };
        let applied = self.bindings.apply(doc, messages);
        debug!(%locale, applied, total = self.bindings.len(), "applied translations");
        true
    }

    /// Make `locale` active: persist it, mirror it onto the document
    /// language and the toggle labels, and translate the page.
    pub fn set_locale(&self, doc: &mut Document, prefs: &mut Preferences, locale: Locale) {
        doc.set_lang(locale.code());
        prefs.set_locale(locale);
        self.update_toggle_labels(doc, locale);
        self.apply(doc, locale);
    }

    /// Switch to the other locale; returns the new one.
    pub fn toggle_language(&self, doc: &mut Document, prefs: &mut Preferences) -> Locale {
        let next = active_locale(doc).other();
        self.set_locale(doc, prefs, next);
        next
    }

    /// Apply the saved locale at page load without writing it back.
    pub fn restore_saved(&self, doc: &mut Document, prefs: &Preferences) -> Locale {
        let locale = prefs.locale();
        doc.set_lang(locale.code());
        self.update_toggle_labels(doc, locale);
        self.apply(doc, locale);
        locale
    }

    /// Toggles name the locale they switch *to*.
    fn update_toggle_labels(&self, doc: &mut Document, active: Locale) {
        for toggle in &self.toggles {
            doc.set_text_content(*toggle, active.other().short_label());
        }
    }
}

/// The locale currently mirrored on the document, `en` when unset.
pub fn active_locale(doc: &Document) -> Locale {
    doc.lang().and_then(Locale::from_tag).unwrap_or_default()
}
