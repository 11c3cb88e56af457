//! Navigation glue: the mobile menu, the active nav link, anchor
//! scrolling and page transitions.
use tracing::debug;

use crate::dom::{Document, NodeId};

pub const MOBILE_TOGGLE_CLASS: &str = "mobile-toggle";
pub const NAV_MENU_CLASS: &str = "nav-menu";
pub const NAV_LINK_CLASS: &str = "nav-link";
pub const ACTIVE_CLASS: &str = "active";
pub const MENU_OPEN_LABEL: &str = "✕";
pub const MENU_CLOSED_LABEL: &str = "☰";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    pub toggle: Option<NodeId>,
    pub menu: Option<NodeId>,
}

impl MobileMenu {
    pub fn find(doc: &Document) -> Self {
        MobileMenu {
            toggle: doc.query_first_class(MOBILE_TOGGLE_CLASS),
            menu: doc.query_first_class(NAV_MENU_CLASS),
        }
    }

    /// Both halves are needed for the toggle to do anything.
    pub fn is_complete(&self) -> bool {
        self.toggle.is_some() && self.menu.is_some()
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        self.menu.is_some_and(|menu| doc.has_class(menu, ACTIVE_CLASS))
    }

    /// Flip the menu; returns whether it is now open.
    pub fn toggle(&self, doc: &mut Document) -> bool {
        let (Some(toggle), Some(menu)) = (self.toggle, self.menu) else {
            return false;
        };
        let open = doc.toggle_class(menu, ACTIVE_CLASS);
        doc.set_text_content(toggle, if open { MENU_OPEN_LABEL } else { MENU_CLOSED_LABEL });
        debug!(open, "mobile menu toggled");
        open
    }

    pub fn close(&self, doc: &mut Document) {
        if let Some(menu) = self.menu {
            doc.remove_class(menu, ACTIVE_CLASS);
        }
        if let Some(toggle) = self.toggle {
            doc.set_text_content(toggle, MENU_CLOSED_LABEL);
        }
    }

    /// Close unless `target` is inside the menu or its toggle.
    pub fn close_if_outside(&self, doc: &mut Document, target: NodeId) {
        let (Some(toggle), Some(menu)) = (self.toggle, self.menu) else {
            return;
        };
        if !doc.contains(menu, target) && !doc.contains(toggle, target) {
            self.close(doc);
        }
    }

    /// `Escape` closes an open menu; returns whether it did.
    pub fn close_on_key(&self, doc: &mut Document, key: &str) -> bool {
        if key != "Escape" || !self.is_open(doc) {
            return false;
        }
        self.close(doc);
        true
    }
}

/// Highlight the nav link pointing at the current page.
pub fn update_active_nav_link(doc: &mut Document) {
    let current = doc.current_page().to_string();
    let on_home = current == "index.html";
    for link in doc.query_class(NAV_LINK_CLASS) {
        let href = doc.attr(link, "href").unwrap_or_default();
        let active = if on_home && (href == "index.html" || href == "/") {
            true
        } else {
            !href.is_empty() && href.contains(current.as_str())
        };
        doc.set_class(link, ACTIVE_CLASS, active);
    }
}

/// In-page links: `<a href="#...">`.
pub fn anchor_links(doc: &Document) -> Vec<NodeId> {
    doc.query(|el| el.tag() == "a" && el.attr("href").is_some_and(|href| href.starts_with('#')))
}

/// Scroll so the link's target sits `offset` px below the top, clearing
/// the fixed navbar. Returns the new scroll offset, or `None` when the
/// link has no target on the page.
pub fn scroll_to_anchor(doc: &mut Document, link: NodeId, offset: f64) -> Option<f64> {
    let href = doc.attr(link, "href")?;
    let target = doc.get_element_by_id(href.strip_prefix('#')?)?;
    let top = doc.get(target)?.top();
    doc.set_scroll_y(top - offset);
    debug!(href = %doc.attr(link, "href").unwrap_or_default(), scroll_y = doc.scroll_y(), "scrolled to anchor");
    Some(doc.scroll_y())
}

/// Fade the page out ahead of a navigation.
pub fn begin_page_transition(doc: &mut Document) {
    let body = doc.body();
    doc.set_style(body, "opacity", "0");
}

/// Fade the page in once it has loaded.
pub fn show_page(doc: &mut Document) {
    let body = doc.body();
    doc.set_style(body, "opacity", "1");
}
