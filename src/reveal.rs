//! Viewport intersection observers: one-shot reveal animations and lazy
//! image loading.
use tracing::debug;

use crate::dom::{Document, NodeId};

pub const REVEAL_CLASS: &str = "animate-on-scroll";
pub const VISIBLE_CLASS: &str = "visible";
pub const LAZY_SRC_ATTR: &str = "data-src";
pub const LAZY_CLASS: &str = "lazy";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element that must be inside the viewport
    pub threshold: f64,
    /// Pixels trimmed off the bottom of the viewport
    pub bottom_margin: f64,
}

/// Fraction of an element's box between `view_top` and `view_bottom`.
/// A zero-height box counts as fully visible when its top edge is inside.
pub fn intersection_ratio(top: f64, height: f64, view_top: f64, view_bottom: f64) -> f64 {
    if height <= 0.0 {
        return if top >= view_top && top <= view_bottom { 1.0 } else { 0.0 };
    }
    let overlap = (top + height).min(view_bottom) - top.max(view_top);
    (overlap / height).clamp(0.0, 1.0)
}

/// Watches a set of elements and hands each back once, the first time it
/// is far enough into the viewport.
#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    targets: Vec<NodeId>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions, targets: Vec<NodeId>) -> Self {
        VisibilityObserver { options, targets }
    }

    pub fn observe(&mut self, node: NodeId) {
        if !self.targets.contains(&node) {
            self.targets.push(node);
        }
    }

    pub fn unobserve(&mut self, node: NodeId) {
        self.targets.retain(|t| *t != node);
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn is_intersecting(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.get(node) else {
            return false;
        };
        let view_top = doc.scroll_y();
        let view_bottom = view_top + doc.viewport_height() - self.options.bottom_margin;
        let ratio = intersection_ratio(el.top(), el.height(), view_top, view_bottom);
        ratio > 0.0 && ratio >= self.options.threshold
    }

    /// Stop observing and return every target now intersecting.
    pub fn take_intersecting(&mut self, doc: &Document) -> Vec<NodeId> {
        let (hit, rest): (Vec<NodeId>, Vec<NodeId>) =
            self.targets.iter().partition(|node| self.is_intersecting(doc, **node));
        self.targets = rest;
        hit
    }
}

/// Observer over the page's `.animate-on-scroll` elements.
pub fn reveal_observer(doc: &Document, options: ObserverOptions) -> VisibilityObserver {
    VisibilityObserver::new(options, doc.query_class(REVEAL_CLASS))
}

/// Mark newly visible elements; they stay visible for good.
pub fn reveal(doc: &mut Document, observer: &mut VisibilityObserver) -> usize {
    let hits = observer.take_intersecting(doc);
    for node in &hits {
        doc.add_class(*node, VISIBLE_CLASS);
    }
    if !hits.is_empty() {
        debug!(revealed = hits.len(), remaining = observer.targets().len(), "revealed elements");
    }
    hits.len()
}

/// Observer over `img[data-src]`, loading as soon as any pixel shows.
pub fn lazy_image_observer(doc: &Document) -> VisibilityObserver {
    let options = ObserverOptions {
        threshold: 0.0,
        bottom_margin: 0.0,
    };
    let images = doc.query(|el| el.tag() == "img" && el.has_attr(LAZY_SRC_ATTR));
    VisibilityObserver::new(options, images)
}

/// Swap in the real source of every image that came into view.
pub fn load_visible_images(doc: &mut Document, observer: &mut VisibilityObserver) -> usize {
    let hits = observer.take_intersecting(doc);
    for image in &hits {
        if let Some(src) = doc.attr(*image, LAZY_SRC_ATTR).map(str::to_string) {
            doc.set_attr(*image, "src", &src);
        }
        doc.remove_class(*image, LAZY_CLASS);
    }
    hits.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSpec;

    const OPTIONS: ObserverOptions = ObserverOptions {
        threshold: 0.1,
        bottom_margin: 50.0,
    };

    #[test]
    fn test_intersection_ratio() {
        assert_eq!(intersection_ratio(0.0, 100.0, 0.0, 800.0), 1.0);
        assert_eq!(intersection_ratio(750.0, 100.0, 0.0, 800.0), 0.5);
        assert_eq!(intersection_ratio(900.0, 100.0, 0.0, 800.0), 0.0);
        assert_eq!(intersection_ratio(-60.0, 100.0, 0.0, 800.0), 0.4);
        assert_eq!(intersection_ratio(100.0, 0.0, 0.0, 800.0), 1.0);
    }

    #[test]
    fn test_reveal_respects_threshold_and_margin() {
        let mut doc = Document::new("/");
        doc.set_viewport_height(800.0);
        let body = doc.body();
        // Viewport bottom is 750 after the margin; 10% of 100px is 10px.
        let near = doc.append(body, &ElementSpec::new("div").class(REVEAL_CLASS).layout(745.0, 100.0));
        let enough = doc.append(body, &ElementSpec::new("div").class(REVEAL_CLASS).layout(740.0, 100.0));

        let mut observer = reveal_observer(&doc, OPTIONS);
        assert_eq!(reveal(&mut doc, &mut observer), 1);
        assert!(doc.has_class(enough, VISIBLE_CLASS));
        assert!(!doc.has_class(near, VISIBLE_CLASS));

        doc.set_scroll_y(20.0);
        assert_eq!(reveal(&mut doc, &mut observer), 1);
        assert!(doc.has_class(near, VISIBLE_CLASS));
        assert!(observer.is_empty());
    }

    #[test]
    fn test_reveal_is_one_shot() {
        let mut doc = Document::new("/");
        let body = doc.body();
        let node = doc.append(body, &ElementSpec::new("div").class(REVEAL_CLASS).layout(100.0, 100.0));
        let mut observer = reveal_observer(&doc, OPTIONS);
        reveal(&mut doc, &mut observer);

        doc.set_scroll_y(5000.0);
        assert_eq!(reveal(&mut doc, &mut observer), 0);
        assert!(doc.has_class(node, VISIBLE_CLASS));
    }

    #[test]
    fn test_lazy_images_load_once_in_view() {
        let mut doc = Document::new("/");
        let body = doc.body();
        let image = doc.append(
            body,
            &ElementSpec::new("img")
                .class(LAZY_CLASS)
                .attr(LAZY_SRC_ATTR, "/img/hero.webp")
                .layout(1200.0, 300.0),
        );
        let mut observer = lazy_image_observer(&doc);
        assert_eq!(load_visible_images(&mut doc, &mut observer), 0);
        assert_eq!(doc.attr(image, "src"), None);

        doc.set_scroll_y(500.0);
        assert_eq!(load_visible_images(&mut doc, &mut observer), 1);
        assert_eq!(doc.attr(image, "src"), Some("/img/hero.webp"));
        assert!(!doc.has_class(image, LAZY_CLASS));
        assert!(observer.is_empty());
    }
}
