//! Hover and touch effects on service and portfolio cards.
use std::collections::HashMap;

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::tabs::{CATEGORIES_ATTR, ITEM_CLASS, parse_categories};

pub const SERVICE_CARD_CLASS: &str = "service-item";
pub const PORTFOLIO_IMAGE_CLASS: &str = "portfolio-image";
pub const UI_UX_CATEGORY: &str = "ui-ux";
pub const RESET_TRANSFORM: &str = "translateY(0) scale(1)";

/// Vertical drag, in pixels, before a touch counts as a pan.
const PAN_DRAG_THRESHOLD: f64 = 10.0;

/// Which card family lifts on hover, decided by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardLift {
    Service,
    Portfolio,
}

impl CardLift {
    /// Cards only lift on the services and portfolio pages.
    pub fn for_page(page: &str) -> Option<CardLift> {
        match page {
            "services.html" => Some(CardLift::Service),
            "portfolio.html" => Some(CardLift::Portfolio),
            _ => None,
        }
    }

    pub fn card_class(self) -> &'static str {
        match self {
            CardLift::Service => SERVICE_CARD_CLASS,
            CardLift::Portfolio => ITEM_CLASS,
        }
    }

    pub fn hover_transform(self) -> &'static str {
        match self {
            CardLift::Service => "translateY(-10px) scale(1.02)",
            CardLift::Portfolio => "translateY(-15px) scale(1.03)",
        }
    }

    pub fn cards(self, doc: &Document) -> Vec<NodeId> {
        doc.query_class(self.card_class())
    }

    pub fn apply(self, doc: &mut Document, card: NodeId, hovered: bool) {
        let transform = if hovered { self.hover_transform() } else { RESET_TRANSFORM };
        doc.set_style(card, "transform", transform);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanPosition {
    Top,
    Bottom,
}

impl PanPosition {
    pub fn object_position(self) -> &'static str {
        match self {
            PanPosition::Top => "center top",
            PanPosition::Bottom => "center bottom",
        }
    }
}

/// Move a tall screenshot inside its frame over `seconds`.
pub fn pan_image(doc: &mut Document, image: NodeId, position: PanPosition, seconds: u32) {
    doc.set_style(image, "object-position", position.object_position());
    doc.set_style(image, "transition", &format!("object-position {seconds}s ease-in-out"));
}

/// UI/UX portfolio items paired with the screenshot they pan.
pub fn ui_ux_items(doc: &Document) -> Vec<(NodeId, NodeId)> {
    doc.query_class(ITEM_CLASS)
        .into_iter()
        .filter(|item| {
            doc.attr(*item, CATEGORIES_ATTR)
                .is_some_and(|list| parse_categories(list).iter().any(|c| c == UI_UX_CATEGORY))
        })
        .filter_map(|item| {
            let image = doc
                .query_within(item, |el| el.has_class(PORTFOLIO_IMAGE_CLASS))
                .into_iter()
                .flat_map(|frame| doc.query_within(frame, |el| el.tag() == "img"))
                .next()?;
            Some((item, image))
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Touch {
    start_y: f64,
    panned: bool,
}

/// Touch state per image, so two cards never share a gesture.
#[derive(Debug, Clone, Default)]
pub struct TouchPans {
    touches: HashMap<NodeId, Touch>,
}

impl TouchPans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, image: NodeId, y: f64) {
        self.touches.insert(image, Touch { start_y: y, panned: false });
    }

    /// Pan once the finger has dragged far enough: up reveals the bottom
    /// of the screenshot, down the top. A gesture pans at most once.
    /// Returns whether the image moved.
    pub fn drag(&mut self, doc: &mut Document, image: NodeId, y: f64) -> bool {
        let Some(touch) = self.touches.get_mut(&image) else {
            return false;
        };
        if touch.panned {
            return false;
        }
        let delta = touch.start_y - y;
        if delta.abs() <= PAN_DRAG_THRESHOLD {
            return false;
        }
        touch.panned = true;
        let position = if delta > 0.0 { PanPosition::Bottom } else { PanPosition::Top };
        pan_image(doc, image, position, 4);
        debug!(?position, "image panned by touch");
        true
    }

    /// End the gesture; true when the image was panned and needs a reset.
    pub fn end(&mut self, image: NodeId) -> bool {
        self.touches.remove(&image).is_some_and(|touch| touch.panned)
    }

    pub fn is_touching(&self, image: NodeId) -> bool {
        self.touches.contains_key(&image)
    }
}
