//! Light/dark theme state and navbar styling.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::storage::Preferences;

pub const THEME_TOGGLE_CLASS: &str = "theme-toggle";
pub const THEME_ATTR: &str = "data-theme";
pub const TRANSITION_CLASS: &str = "theme-transitioning";
pub const NAVBAR_CLASS: &str = "navbar";

const SUN_ICON: &str = r#"<i class="fas fa-sun"></i>"#;
const MOON_ICON: &str = r#"<i class="fas fa-moon"></i>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// The theme the body currently presents.
    pub fn from_document(doc: &Document) -> Theme {
        match doc.attr(doc.body(), THEME_ATTR) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

/// Navbar background for a theme at a scroll offset. The bar turns more
/// opaque once the page has scrolled past `threshold`.
pub fn navbar_background(theme: Theme, scroll_y: f64, threshold: f64) -> &'static str {
    let scrolled = scroll_y > threshold;
    match (theme, scrolled) {
        (Theme::Dark, false) => "rgba(0, 0, 0, 0.9)",
        (Theme::Dark, true) => "rgba(0, 0, 0, 0.95)",
        (Theme::Light, false) => "rgba(255, 255, 255, 0.95)",
        (Theme::Light, true) => "rgba(255, 255, 255, 0.98)",
    }
}

/// Restyle every `.navbar` from the presented theme and scroll offset.
pub fn style_navbar(doc: &mut Document, threshold: f64) {
    let background = navbar_background(Theme::from_document(doc), doc.scroll_y(), threshold);
    for navbar in doc.query_class(NAVBAR_CLASS) {
        doc.set_style(navbar, "background", background);
    }
}

/// Drop the transition marker added by [`ThemeController::toggle`].
pub fn end_transition(doc: &mut Document) {
    let body = doc.body();
    doc.remove_class(body, TRANSITION_CLASS);
}

#[derive(Debug, Clone)]
pub struct ThemeController {
    toggle: NodeId,
    navbar_threshold: f64,
}

impl ThemeController {
    /// Bind to the page's `.theme-toggle` and apply the saved theme.
    /// Pages without a toggle keep their authored theme.
    pub fn init(doc: &mut Document, prefs: &Preferences, navbar_threshold: f64) -> Option<Self> {
        let Some(toggle) = doc.query_first_class(THEME_TOGGLE_CLASS) else {
            debug!("no theme toggle on page, skipping theme init");
            return None;
        };
        let controller = ThemeController {
            toggle,
            navbar_threshold,
        };
        controller.apply(doc, prefs.theme());
        Some(controller)
    }

    pub fn toggle_element(&self) -> NodeId {
        self.toggle
    }

    pub fn apply(&self, doc: &mut Document, theme: Theme) {
        let body = doc.body();
        match theme {
            Theme::Light => {
                doc.set_attr(body, THEME_ATTR, "light");
                doc.set_inner_html(self.toggle, MOON_ICON);
                doc.set_attr(self.toggle, "title", "Switch to dark mode");
            }
            Theme::Dark => {
                doc.remove_attr(body, THEME_ATTR);
                doc.set_inner_html(self.toggle, SUN_ICON);
                doc.set_attr(self.toggle, "title", "Switch to light mode");
            }
        }
        style_navbar(doc, self.navbar_threshold);
    }

    /// Flip the theme and persist it. The body carries the transition
    /// marker until [`end_transition`] runs.
    pub fn toggle(&self, doc: &mut Document, prefs: &mut Preferences) -> Theme {
        let next = Theme::from_document(doc).toggled();
        let body = doc.body();
        doc.add_class(body, TRANSITION_CLASS);
        self.apply(doc, next);
        prefs.set_theme(next);
        debug!(theme = next.as_str(), "theme toggled");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSpec;
    use crate::storage::UnavailableStore;

    fn page() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("/");
        let body = doc.body();
        let navbar = doc.append(body, &ElementSpec::new("nav").class(NAVBAR_CLASS));
        let toggle = doc.append(body, &ElementSpec::new("button").class(THEME_TOGGLE_CLASS));
        (doc, navbar, toggle)
    }

    #[test]
    fn test_navbar_background_table() {
        assert_eq!(navbar_background(Theme::Dark, 0.0, 50.0), "rgba(0, 0, 0, 0.9)");
        assert_eq!(navbar_background(Theme::Dark, 50.0, 50.0), "rgba(0, 0, 0, 0.9)");
        assert_eq!(navbar_background(Theme::Dark, 51.0, 50.0), "rgba(0, 0, 0, 0.95)");
        assert_eq!(navbar_background(Theme::Light, 10.0, 50.0), "rgba(255, 255, 255, 0.95)");
        assert_eq!(navbar_background(Theme::Light, 400.0, 50.0), "rgba(255, 255, 255, 0.98)");
    }

    #[test]
    fn test_init_applies_default_dark() {
        let (mut doc, navbar, toggle) = page();
        let prefs = Preferences::in_memory();
        ThemeController::init(&mut doc, &prefs, 50.0).unwrap();
        assert_eq!(doc.attr(doc.body(), THEME_ATTR), None);
        assert_eq!(doc.attr(toggle, "title"), Some("Switch to light mode"));
        assert!(doc.to_html().contains("fa-sun"));
        assert_eq!(doc.style(navbar, "background"), Some("rgba(0, 0, 0, 0.9)"));
    }

    #[test]
    fn test_init_applies_saved_light() {
        let (mut doc, _, toggle) = page();
        let mut prefs = Preferences::in_memory();
        prefs.set_theme(Theme::Light);
        ThemeController::init(&mut doc, &prefs, 50.0).unwrap();
        assert_eq!(Theme::from_document(&doc), Theme::Light);
        assert_eq!(doc.attr(toggle, "title"), Some("Switch to dark mode"));
    }

    #[test]
    fn test_init_without_toggle_is_a_no_op() {
        let mut doc = Document::new("/");
        let mut prefs = Preferences::in_memory();
        prefs.set_theme(Theme::Light);
        assert!(ThemeController::init(&mut doc, &prefs, 50.0).is_none());
        assert_eq!(Theme::from_document(&doc), Theme::Dark);
    }

    #[test]
    fn test_toggle_twice_restores_default() {
        let (mut doc, navbar, _) = page();
        doc.set_scroll_y(120.0);
        let mut prefs = Preferences::in_memory();
        let controller = ThemeController::init(&mut doc, &prefs, 50.0).unwrap();
        let before = doc.style(navbar, "background").map(str::to_string);

        assert_eq!(controller.toggle(&mut doc, &mut prefs), Theme::Light);
        assert_eq!(doc.style(navbar, "background"), Some("rgba(255, 255, 255, 0.98)"));
        assert_eq!(prefs.theme(), Theme::Light);

        assert_eq!(controller.toggle(&mut doc, &mut prefs), Theme::Dark);
        assert_eq!(doc.style(navbar, "background").map(str::to_string), before);
        assert_eq!(prefs.theme(), Theme::Dark);
    }

    #[test]
    fn test_toggle_marks_transition() {
        let (mut doc, _, _) = page();
        let mut prefs = Preferences::in_memory();
        let controller = ThemeController::init(&mut doc, &prefs, 50.0).unwrap();
        controller.toggle(&mut doc, &mut prefs);
        assert!(doc.has_class(doc.body(), TRANSITION_CLASS));
        end_transition(&mut doc);
        assert!(!doc.has_class(doc.body(), TRANSITION_CLASS));
    }

    #[test]
    fn test_toggle_with_storage_unavailable() {
        let (mut doc, _, toggle) = page();
        let mut prefs = Preferences::new(UnavailableStore);
        let controller = ThemeController::init(&mut doc, &prefs, 50.0).unwrap();
        controller.toggle(&mut doc, &mut prefs);
        assert_eq!(doc.attr(doc.body(), THEME_ATTR), Some("light"));
        assert!(doc.to_html().contains("fa-moon"));
        assert_eq!(doc.attr(toggle, "title"), Some("Switch to dark mode"));
        assert_eq!(prefs.theme(), Theme::Dark);
    }
}
