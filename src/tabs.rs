//! Portfolio category filter.
use tracing::debug;

use crate::dom::{Document, NodeId};

pub const TAB_BUTTON_CLASS: &str = "tab-btn";
pub const ITEM_CLASS: &str = "portfolio-item";
pub const CATEGORY_ATTR: &str = "data-category";
pub const CATEGORIES_ATTR: &str = "data-categories";
pub const ALL_CATEGORIES: &str = "all";
pub const HIDDEN_CLASS: &str = "hidden";
pub const ACTIVE_CLASS: &str = "active";

/// Split a comma-separated category list, dropping empty entries.
pub fn parse_categories(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether an item tagged with `categories` shows under `selected`.
pub fn is_visible(selected: &str, categories: &[String]) -> bool {
    selected == ALL_CATEGORIES || categories.iter().any(|c| c == selected)
}

/// Visibility of every item under `selected`, in item order.
pub fn visibility(selected: &str, items: &[Vec<String>]) -> Vec<bool> {
    items.iter().map(|categories| is_visible(selected, categories)).collect()
}

#[derive(Debug, Clone)]
pub struct TabFilter {
    buttons: Vec<NodeId>,
    items: Vec<(NodeId, Vec<String>)>,
}

impl TabFilter {
    /// Bind to the page's tab buttons and items. Pages without tab buttons
    /// get no filter.
    ///
    /// Category lists are read with [`parse_categories`], so `"web, ui-ux"`
    /// tags an item `ui-ux`. A literal comma split of the markup would keep
    /// the space and match nothing.
    pub fn init(doc: &Document) -> Option<Self> {
        let buttons = doc.query_class(TAB_BUTTON_CLASS);
        if buttons.is_empty() {
            debug!("no portfolio tabs on page, skipping tab init");
            return None;
        }
        let items = doc
            .query_class(ITEM_CLASS)
            .into_iter()
            .map(|item| {
                let categories = doc.attr(item, CATEGORIES_ATTR).map(parse_categories).unwrap_or_default();
                (item, categories)
            })
            .collect();
        Some(TabFilter { buttons, items })
    }

    pub fn buttons(&self) -> &[NodeId] {
        &self.buttons
    }

    /// The `all` button, if the page has one.
    pub fn all_button(&self, doc: &Document) -> Option<NodeId> {
        self.buttons
            .iter()
            .copied()
            .find(|button| doc.attr(*button, CATEGORY_ATTR) == Some(ALL_CATEGORIES))
    }

    /// Make `button` the only active tab and filter the items by its
    /// category. A button without a category matches no item.
    pub fn activate(&self, doc: &mut Document, button: NodeId) {
        let selected = doc.attr(button, CATEGORY_ATTR).unwrap_or_default().to_string();
        for other in &self.buttons {
            doc.remove_class(*other, ACTIVE_CLASS);
        }
        doc.add_class(button, ACTIVE_CLASS);

        let mut shown = 0;
        for (item, categories) in &self.items {
            let visible = !selected.is_empty() && is_visible(&selected, categories);
            doc.set_class(*item, HIDDEN_CLASS, !visible);
            shown += usize::from(visible);
        }
        debug!(category = %selected, shown, total = self.items.len(), "portfolio filtered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSpec;
    use proptest::prelude::*;

    fn page() -> (Document, Vec<NodeId>, Vec<NodeId>) {
        let mut doc = Document::new("/portfolio.html");
        let body = doc.body();
        let buttons = ["all", "web", "ui-ux"]
            .iter()
            .map(|c| doc.append(body, &ElementSpec::new("button").class(TAB_BUTTON_CLASS).attr(CATEGORY_ATTR, c)))
            .collect();
        let items = ["web,ui-ux", "ai", "web"]
            .iter()
            .map(|c| doc.append(body, &ElementSpec::new("div").class(ITEM_CLASS).attr(CATEGORIES_ATTR, c)))
            .collect();
        (doc, buttons, items)
    }

    fn visible(doc: &Document, items: &[NodeId]) -> Vec<bool> {
        items.iter().map(|item| !doc.has_class(*item, HIDDEN_CLASS)).collect()
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(parse_categories("web, ui-ux,,ai"), vec!["web", "ui-ux", "ai"]);
        assert!(parse_categories("").is_empty());
    }

    #[test]
    fn test_all_shows_everything() {
        let items = vec![vec!["web".to_string()], vec![], vec!["ai".to_string()]];
        assert_eq!(visibility("all", &items), vec![true, true, true]);
    }

    #[test]
    fn test_activate_filters_and_switches_active_tab() {
        let (mut doc, buttons, items) = page();
        let filter = TabFilter::init(&doc).unwrap();

        filter.activate(&mut doc, buttons[1]);
        assert_eq!(visible(&doc, &items), vec![true, false, true]);
        assert!(doc.has_class(buttons[1], ACTIVE_CLASS));
        assert!(!doc.has_class(buttons[0], ACTIVE_CLASS));

        filter.activate(&mut doc, buttons[0]);
        assert_eq!(visible(&doc, &items), vec![true, true, true]);
        assert!(!doc.has_class(buttons[1], ACTIVE_CLASS));
    }

    #[test]
    fn test_spaced_category_list_still_matches() {
        let (mut doc, buttons, _) = page();
        let body = doc.body();
        let spaced = doc.append(body, &ElementSpec::new("div").class(ITEM_CLASS).attr(CATEGORIES_ATTR, "ai, ui-ux"));
        let filter = TabFilter::init(&doc).unwrap();
        filter.activate(&mut doc, buttons[2]);
        assert!(!doc.has_class(spaced, HIDDEN_CLASS));
    }

    #[test]
    fn test_all_button_lookup() {
        let (doc, buttons, _) = page();
        let filter = TabFilter::init(&doc).unwrap();
        assert_eq!(filter.all_button(&doc), Some(buttons[0]));
    }

    #[test]
    fn test_no_buttons_no_filter() {
        let doc = Document::new("/");
        assert!(TabFilter::init(&doc).is_none());
    }

    proptest! {
        #[test]
        fn prop_selection_matches_membership(
            items in proptest::collection::vec(
                proptest::collection::vec(prop_oneof!["web", "ai", "ui-ux", "brand"], 0..3),
                0..10,
            ),
            selected in prop_oneof!["all", "web", "ai", "ui-ux"],
        ) {
            let items: Vec<Vec<String>> = items
                .into_iter()
                .map(|cats| cats.into_iter().map(String::from).collect())
                .collect();
            let shown = visibility(&selected, &items);
            for (categories, visible) in items.iter().zip(shown) {
                let expected = selected == "all" || categories.contains(&selected);
                prop_assert_eq!(visible, expected);
            }
        }
    }
}
