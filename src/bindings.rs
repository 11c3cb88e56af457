//! Registry of translatable elements.
//!
//! Collected once from the `data-translate`, `data-translate-html` and
//! `data-translate-placeholder` attributes, then iterated directly on every
//! locale change.
use tracing::debug;

use crate::dictionary::LocalizedMessages;
use crate::dom::{Document, NodeId};

pub const TRANSLATE_ATTR: &str = "data-translate";
pub const TRANSLATE_HTML_ATTR: &str = "data-translate-html";
pub const TRANSLATE_PLACEHOLDER_ATTR: &str = "data-translate-placeholder";

/// How a bound message is written into its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Replace the text content, no markup interpretation
    Text,
    /// Replace the inner markup with the message verbatim
    Markup,
    /// Set the `placeholder` attribute
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub node: NodeId,
    pub kind: BindingKind,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationBindings {
    bindings: Vec<Binding>,
}

impl TranslationBindings {
    /// Scan `doc` once. Content bindings come first, then placeholder
    /// bindings, each in document order; empty keys are ignored.
    pub fn scan(doc: &Document) -> Self {
        let mut bindings = Vec::new();

        for node in doc.query_attr(TRANSLATE_ATTR) {
            let Some(key) = doc.attr(node, TRANSLATE_ATTR).filter(|k| !k.is_empty()) else {
                continue;
            };
            let kind = if doc.attr(node, TRANSLATE_HTML_ATTR) == Some("true") {
                BindingKind::Markup
            } else {
                BindingKind::Text
            };
            bindings.push(Binding {
                node,
                kind,
                key: key.to_string(),
            });
        }

        for node in doc.query_attr(TRANSLATE_PLACEHOLDER_ATTR) {
            let Some(key) = doc.attr(node, TRANSLATE_PLACEHOLDER_ATTR).filter(|k| !k.is_empty()) else {
                continue;
            };
            bindings.push(Binding {
                node,
                kind: BindingKind::Placeholder,
                key: key.to_string(),
            });
        }

        debug!(count = bindings.len(), "collected translation bindings");
        TranslationBindings { bindings }
    }

    /// Write every bound message present in `messages`; returns how many
    /// bindings were applied. Keys missing from `messages` leave their
    /// element untouched.
    pub fn apply(&self, doc: &mut Document, messages: &LocalizedMessages) -> usize {
        let mut applied = 0;
        for binding in &self.bindings {
            let Some(value) = messages.get_message(&binding.key) else {
                continue;
            };
            match binding.kind {
                BindingKind::Text => doc.set_text_content(binding.node, value),
                BindingKind::Markup => doc.set_inner_html(binding.node, value),
                BindingKind::Placeholder => doc.set_attr(binding.node, "placeholder", value),
            }
            applied += 1;
        }
        applied
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Content, ElementSpec};

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("/");
        let body = doc.body();
        let title = doc.append(body, &ElementSpec::new("h1").attr(TRANSLATE_ATTR, "hero.heading").text("old"));
        let rich = doc.append(
            body,
            &ElementSpec::new("p")
                .attr(TRANSLATE_ATTR, "hero.rich")
                .attr(TRANSLATE_HTML_ATTR, "true"),
        );
        let input = doc.append(
            body,
            &ElementSpec::new("input")
                .attr(TRANSLATE_PLACEHOLDER_ATTR, "form.name")
                .attr(TRANSLATE_ATTR, ""),
        );
        (doc, title, rich, input)
    }

    #[test]
    fn test_scan_classifies_bindings() {
        let (doc, title, rich, input) = page();
        let bindings = TranslationBindings::scan(&doc);
        assert_eq!(
            bindings.bindings(),
            &[
                Binding { node: title, kind: BindingKind::Text, key: "hero.heading".into() },
                Binding { node: rich, kind: BindingKind::Markup, key: "hero.rich".into() },
                Binding { node: input, kind: BindingKind::Placeholder, key: "form.name".into() },
            ]
        );
    }

    #[test]
    fn test_apply_writes_by_kind() {
        let (mut doc, title, rich, input) = page();
        let bindings = TranslationBindings::scan(&doc);
        let mut messages = LocalizedMessages::new();
        messages
            .with_message("hero.heading", "<b>not bold</b>")
            .with_message("hero.rich", "Expert <span>Web</span>")
            .with_message("form.name", "Your Name");

        assert_eq!(bindings.apply(&mut doc, &messages), 3);
        assert_eq!(doc.get(title).map(|e| e.content().clone()), Some(Content::Text("<b>not bold</b>".into())));
        assert_eq!(doc.get(rich).map(|e| e.content().clone()), Some(Content::Markup("Expert <span>Web</span>".into())));
        assert_eq!(doc.attr(input, "placeholder"), Some("Your Name"));
    }

    #[test]
    fn test_missing_keys_are_left_alone() {
        let (mut doc, title, _, input) = page();
        let bindings = TranslationBindings::scan(&doc);
        assert_eq!(bindings.apply(&mut doc, &LocalizedMessages::new()), 0);
        assert_eq!(doc.text_content(title), "old");
        assert_eq!(doc.attr(input, "placeholder"), None);
    }
}
