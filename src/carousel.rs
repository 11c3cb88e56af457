//! Hero carousel.
use tracing::debug;

use crate::dom::{Document, NodeId};

pub const SLIDE_CLASS: &str = "carousel-slide";
pub const INDICATOR_CLASS: &str = "indicator";
pub const ACTIVE_CLASS: &str = "active";

/// Position within a fixed, non-empty set of slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    current: usize,
    count: usize,
}

impl Carousel {
    /// `None` for an empty slide set.
    pub fn new(count: usize) -> Option<Self> {
        (count > 0).then_some(Carousel { current: 0, count })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Step to the next slide, wrapping at the end.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.count;
        self.current
    }

    /// Jump to `index`; out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }
        self.current = index;
        true
    }
}

#[derive(Debug, Clone)]
pub struct CarouselController {
    state: Carousel,
    slides: Vec<NodeId>,
    indicators: Vec<NodeId>,
}

impl CarouselController {
    /// Bind to the page's slides and indicators and show the first slide.
    pub fn init(doc: &mut Document) -> Option<Self> {
        let slides = doc.query_class(SLIDE_CLASS);
        let Some(state) = Carousel::new(slides.len()) else {
            debug!("no carousel slides on page, skipping carousel init");
            return None;
        };
        let controller = CarouselController {
            state,
            slides,
            indicators: doc.query_class(INDICATOR_CLASS),
        };
        controller.render(doc);
        debug!(slides = controller.slides.len(), indicators = controller.indicators.len(), "carousel ready");
        Some(controller)
    }

    pub fn current(&self) -> usize {
        self.state.current()
    }

    pub fn slides(&self) -> &[NodeId] {
        &self.slides
    }

    pub fn indicators(&self) -> &[NodeId] {
        &self.indicators
    }

    pub fn tick(&mut self, doc: &mut Document) {
        self.state.advance();
        self.render(doc);
    }

    pub fn select(&mut self, doc: &mut Document, index: usize) -> bool {
        if !self.state.go_to(index) {
            debug!(index, count = self.state.count(), "ignoring out-of-range slide");
            return false;
        }
        self.render(doc);
        true
    }

    /// Slides and indicators are updated in the same pass, so the page
    /// never shows zero or two active slides.
    fn render(&self, doc: &mut Document) {
        let current = self.state.current();
        for (index, slide) in self.slides.iter().enumerate() {
            doc.set_class(*slide, ACTIVE_CLASS, index == current);
        }
        for (index, indicator) in self.indicators.iter().enumerate() {
            doc.set_class(*indicator, ACTIVE_CLASS, index == current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSpec;
    use proptest::prelude::*;

    fn page(slides: usize) -> Document {
        let mut doc = Document::new("/");
        let body = doc.body();
        for _ in 0..slides {
            doc.append(body, &ElementSpec::new("div").class(SLIDE_CLASS));
        }
        for _ in 0..slides {
            doc.append(body, &ElementSpec::new("button").class(INDICATOR_CLASS));
        }
        doc
    }

    fn active(doc: &Document, nodes: &[NodeId]) -> Vec<usize> {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| doc.has_class(**node, ACTIVE_CLASS))
            .map(|(index, _)| index)
            .collect()
    }

    #[test]
    fn test_empty_slide_set() {
        assert!(Carousel::new(0).is_none());
        let mut doc = page(0);
        assert!(CarouselController::init(&mut doc).is_none());
    }

    #[test]
    fn test_init_shows_first_slide() {
        let mut doc = page(3);
        let controller = CarouselController::init(&mut doc).unwrap();
        assert_eq!(active(&doc, controller.slides()), vec![0]);
        assert_eq!(active(&doc, controller.indicators()), vec![0]);
    }

    #[test]
    fn test_select_jumps_and_ignores_out_of_range() {
        let mut doc = page(3);
        let mut controller = CarouselController::init(&mut doc).unwrap();
        assert!(controller.select(&mut doc, 2));
        assert_eq!(active(&doc, controller.slides()), vec![2]);
        assert!(!controller.select(&mut doc, 3));
        assert_eq!(active(&doc, controller.slides()), vec![2]);
        controller.tick(&mut doc);
        assert_eq!(controller.current(), 0);
    }

    proptest! {
        #[test]
        fn prop_ticks_wrap_with_one_active(count in 1usize..8, ticks in 0usize..40) {
            let mut doc = page(count);
            let mut controller = CarouselController::init(&mut doc).unwrap();
            for _ in 0..ticks {
                controller.tick(&mut doc);
                prop_assert_eq!(active(&doc, controller.slides()).len(), 1);
                prop_assert_eq!(active(&doc, controller.indicators()).len(), 1);
            }
            prop_assert_eq!(controller.current(), ticks % count);
            prop_assert_eq!(active(&doc, controller.slides()), vec![ticks % count]);
        }
    }
}
