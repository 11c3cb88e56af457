//! Explicit event listener registrations.
//!
//! Every listener the site installs is a `(source, kind, handler)` entry
//! owned by the initialiser that created it, and can be removed again with
//! the [`RegistrationId`] it was given.
use crate::dom::NodeId;
use crate::effects::CardLift;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Scroll,
    KeyDown,
    MouseEnter,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Element(NodeId),
    Document,
    Window,
}

/// An input delivered to the site.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click(NodeId),
    Submit(NodeId),
    /// The window scrolled; the new offset is already on the document
    Scroll,
    KeyDown(String),
    MouseEnter(NodeId),
    MouseLeave(NodeId),
    /// Touch on an element at a client y coordinate
    TouchStart(NodeId, f64),
    TouchMove(NodeId, f64),
    TouchEnd(NodeId),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Click(_) => EventKind::Click,
            Event::Submit(_) => EventKind::Submit,
            Event::Scroll => EventKind::Scroll,
            Event::KeyDown(_) => EventKind::KeyDown,
            Event::MouseEnter(_) => EventKind::MouseEnter,
            Event::MouseLeave(_) => EventKind::MouseLeave,
            Event::TouchStart(..) => EventKind::TouchStart,
            Event::TouchMove(..) => EventKind::TouchMove,
            Event::TouchEnd(_) => EventKind::TouchEnd,
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        match self {
            Event::Click(id)
            | Event::Submit(id)
            | Event::MouseEnter(id)
            | Event::MouseLeave(id)
            | Event::TouchStart(id, _)
            | Event::TouchMove(id, _)
            | Event::TouchEnd(id) => Some(*id),
            Event::Scroll | Event::KeyDown(_) => None,
        }
    }

    /// Whether the event travels from its target up to the document.
    /// Mouse enter/leave fire on the target only.
    pub fn bubbles(&self) -> bool {
        !matches!(self, Event::MouseEnter(_) | Event::MouseLeave(_))
    }
}

/// What a listener does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Handler {
    ToggleMobileMenu,
    CloseMenuOnOutsideClick,
    CloseMenuOnLinkClick,
    CloseMenuOnEscape,
    StyleNavbarOnScroll,
    SelectSlide(usize),
    SelectTab,
    ToggleTheme,
    ToggleLanguage,
    ScrollToAnchor,
    SubmitContactForm,
    RevealOnScroll,
    LazyLoadOnScroll,
    LiftCard(CardLift),
    PanImage { image: NodeId },
}

/// Returned by a handler to stop the event reaching outer listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub id: RegistrationId,
    pub source: EventSource,
    pub kind: EventKind,
    pub handler: Handler,
}

#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: EventSource, kind: EventKind, handler: Handler) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            source,
            kind,
            handler,
        });
        id
    }

    /// Remove one registration; returns whether it existed.
    pub fn deregister(&mut self, id: RegistrationId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub fn deregister_all(&mut self, ids: &[RegistrationId]) {
        self.registrations.retain(|r| !ids.contains(&r.id));
    }

    /// Handlers listening on `source` for `kind`, in registration order.
    pub fn handlers_for(&self, source: EventSource, kind: EventKind) -> Vec<Handler> {
        self.registrations
            .iter()
            .filter(|r| r.source == source && r.kind == kind)
            .map(|r| r.handler.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }
}
