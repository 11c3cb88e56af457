//! The page runtime: owns the document, preferences, listeners and timers,
//! and wires every interactive feature onto them.
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::carousel::CarouselController;
use crate::config::SiteConfig;
use crate::contact::{self, CONTACT_FORM_ID, Enquiry, SUBMIT_FEEDBACK_LABEL};
use crate::dictionary::Dictionary;
use crate::dom::{Document, NodeId};
use crate::effects::{self, CardLift, PanPosition, TouchPans};
use crate::events::{Event, EventKind, EventRegistry, EventSource, Handler, Propagation, RegistrationId};
use crate::locale::Locale;
use crate::localization::{LANGUAGE_TOGGLE_CLASS, Localizer};
use crate::navigation::{self, MobileMenu, NAV_LINK_CLASS};
use crate::reveal::{self, ObserverOptions, VisibilityObserver};
use crate::scheduler::{Scheduler, TimerId, TimerTask};
use crate::storage::Preferences;
use crate::tabs::TabFilter;
use crate::theme::{self, Theme, ThemeController};

/// A running carousel and everything it installed.
struct CarouselBinding {
    controller: CarouselController,
    timer: TimerId,
    registrations: Vec<RegistrationId>,
}

/// Registrations owned by one initialiser, dropped when it runs again.
#[derive(Default)]
struct Installed {
    navigation: Vec<RegistrationId>,
    tabs: Vec<RegistrationId>,
    theme: Vec<RegistrationId>,
    reveal: Vec<RegistrationId>,
    anchors: Vec<RegistrationId>,
    contact: Vec<RegistrationId>,
    image_pans: Vec<RegistrationId>,
    lazy_images: Vec<RegistrationId>,
    language: Vec<RegistrationId>,
    cards: Vec<RegistrationId>,
}

pub struct Site {
    document: Document,
    localizer: Localizer,
    preferences: Preferences,
    config: SiteConfig,
    events: EventRegistry,
    scheduler: Scheduler,
    installed: Installed,
    menu: MobileMenu,
    carousel: Option<CarouselBinding>,
    tabs: Option<TabFilter>,
    theme: Option<ThemeController>,
    reveal: VisibilityObserver,
    lazy_images: VisibilityObserver,
    touch_pans: TouchPans,
}

impl Site {
    /// Wrap a document without initialising anything; see
    /// [`Site::dom_content_loaded`].
    pub fn new(document: Document, dictionary: Arc<Dictionary>, preferences: Preferences, config: SiteConfig) -> Self {
        let localizer = Localizer::new(&document, dictionary);
        let reveal_options = ObserverOptions {
            threshold: config.reveal_threshold,
            bottom_margin: config.reveal_bottom_margin,
        };
        Site {
            localizer,
            preferences,
            config,
            events: EventRegistry::new(),
            scheduler: Scheduler::new(),
            installed: Installed::default(),
            menu: MobileMenu::default(),
            carousel: None,
            tabs: None,
            theme: None,
            reveal: VisibilityObserver::new(reveal_options, Vec::new()),
            lazy_images: VisibilityObserver::new(reveal_options, Vec::new()),
            touch_pans: TouchPans::new(),
            document,
        }
    }

    /// Build a site and run the load sequence on it.
    pub fn load(document: Document, dictionary: Arc<Dictionary>, preferences: Preferences, config: SiteConfig) -> Self {
        let mut site = Site::new(document, dictionary, preferences, config);
        site.dom_content_loaded();
        site.window_loaded();
        site
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn carousel(&self) -> Option<&CarouselController> {
        self.carousel.as_ref().map(|binding| &binding.controller)
    }

    pub fn carousel_timer(&self) -> Option<TimerId> {
        self.carousel.as_ref().map(|binding| binding.timer)
    }

    pub fn theme(&self) -> Theme {
        Theme::from_document(&self.document)
    }

    pub fn theme_toggle(&self) -> Option<NodeId> {
        self.theme.as_ref().map(ThemeController::toggle_element)
    }

    pub fn locale(&self) -> Locale {
        crate::localization::active_locale(&self.document)
    }

    /// Initialise every feature, in page order. Features whose markup is
    /// missing are skipped.
    pub fn dom_content_loaded(&mut self) {
        self.init_navigation();
        self.init_carousel();
        self.init_portfolio_tabs();
        self.init_theme_toggle();
        self.init_scroll_reveal();
        self.init_smooth_scroll();
        self.init_contact_form();
        self.init_ui_ux_effect();
        self.init_lazy_loading();
        self.init_language();
        info!(
            page = %self.document.current_page(),
            listeners = self.events.len(),
            timers = self.scheduler.pending(),
            locale = %self.locale(),
            "page initialised"
        );
    }

    /// Fade the page in and install the page-specific card lifts.
    pub fn window_loaded(&mut self) {
        navigation::show_page(&mut self.document);
        self.events.deregister_all(&self.installed.cards);
        self.installed.cards.clear();
        let Some(lift) = CardLift::for_page(self.document.current_page()) else {
            return;
        };
        for card in lift.cards(&self.document) {
            let source = EventSource::Element(card);
            self.installed.cards.extend([
                self.events.register(source, EventKind::MouseEnter, Handler::LiftCard(lift)),
                self.events.register(source, EventKind::MouseLeave, Handler::LiftCard(lift)),
            ]);
        }
        debug!(?lift, cards = self.installed.cards.len() / 2, "card lifts installed");
    }

    fn init_navigation(&mut self) {
        self.events.deregister_all(&self.installed.navigation);
        let mut installed = Vec::new();

        self.menu = MobileMenu::find(&self.document);
        if let (Some(toggle), Some(_)) = (self.menu.toggle, self.menu.menu) {
            installed.push(self.events.register(
                EventSource::Element(toggle),
                EventKind::Click,
                Handler::ToggleMobileMenu,
            ));
            installed.push(self.events.register(EventSource::Document, EventKind::Click, Handler::CloseMenuOnOutsideClick));
            for link in self.document.query_class(NAV_LINK_CLASS) {
                installed.push(self.events.register(
                    EventSource::Element(link),
                    EventKind::Click,
                    Handler::CloseMenuOnLinkClick,
                ));
            }
            installed.push(self.events.register(EventSource::Document, EventKind::KeyDown, Handler::CloseMenuOnEscape));
        } else {
            debug!("no mobile menu on page");
        }

        navigation::update_active_nav_link(&mut self.document);
        installed.push(self.events.register(EventSource::Window, EventKind::Scroll, Handler::StyleNavbarOnScroll));
        self.installed.navigation = installed;
    }

    /// (Re)start the hero carousel. Any earlier timer and indicator
    /// listeners are removed first, so only one carousel ever runs.
    pub fn init_carousel(&mut self) {
        if let Some(previous) = self.carousel.take() {
            self.scheduler.clear(previous.timer);
            self.events.deregister_all(&previous.registrations);
        }
        let Some(controller) = CarouselController::init(&mut self.document) else {
            return;
        };
        let registrations = controller
            .indicators()
            .iter()
            .enumerate()
            .map(|(index, indicator)| {
                self.events.register(EventSource::Element(*indicator), EventKind::Click, Handler::SelectSlide(index))
            })
            .collect();
        let timer = self.scheduler.set_interval(self.config.carousel_interval, TimerTask::AdvanceCarousel);
        self.carousel = Some(CarouselBinding {
            controller,
            timer,
            registrations,
        });
    }

    /// Bind the portfolio tabs and show every item.
    pub fn init_portfolio_tabs(&mut self) {
        self.events.deregister_all(&self.installed.tabs);
        self.installed.tabs.clear();
        self.tabs = TabFilter::init(&self.document);
        let Some(filter) = &self.tabs else {
            return;
        };
        for button in filter.buttons() {
            self.installed.tabs.push(self.events.register(
                EventSource::Element(*button),
                EventKind::Click,
                Handler::SelectTab,
            ));
        }
        if let Some(all) = filter.all_button(&self.document) {
            filter.activate(&mut self.document, all);
        }
    }

    /// Bind the theme toggle and apply the saved theme.
    pub fn init_theme_toggle(&mut self) {
        self.events.deregister_all(&self.installed.theme);
        self.installed.theme.clear();
        self.theme = ThemeController::init(&mut self.document, &self.preferences, self.config.navbar_scroll_threshold);
        if let Some(controller) = &self.theme {
            self.installed.theme.push(self.events.register(
                EventSource::Element(controller.toggle_element()),
                EventKind::Click,
                Handler::ToggleTheme,
            ));
        }
    }

    fn init_scroll_reveal(&mut self) {
        self.events.deregister_all(&self.installed.reveal);
        self.installed.reveal.clear();
        let options = ObserverOptions {
            threshold: self.config.reveal_threshold,
            bottom_margin: self.config.reveal_bottom_margin,
        };
        self.reveal = reveal::reveal_observer(&self.document, options);
        if self.reveal.is_empty() {
            return;
        }
        reveal::reveal(&mut self.document, &mut self.reveal);
        self.installed.reveal.push(self.events.register(EventSource::Window, EventKind::Scroll, Handler::RevealOnScroll));
    }

    fn init_smooth_scroll(&mut self) {
        self.events.deregister_all(&self.installed.anchors);
        self.installed.anchors = navigation::anchor_links(&self.document)
            .into_iter()
            .map(|link| self.events.register(EventSource::Element(link), EventKind::Click, Handler::ScrollToAnchor))
            .collect();
    }

    fn init_contact_form(&mut self) {
        self.events.deregister_all(&self.installed.contact);
        self.installed.contact.clear();
        let Some(form) = self.document.get_element_by_id(CONTACT_FORM_ID) else {
            debug!("no contact form on page");
            return;
        };
        self.installed.contact.push(self.events.register(
            EventSource::Element(form),
            EventKind::Submit,
            Handler::SubmitContactForm,
        ));
    }

    fn init_ui_ux_effect(&mut self) {
        self.events.deregister_all(&self.installed.image_pans);
        self.installed.image_pans.clear();
        for (item, image) in effects::ui_ux_items(&self.document) {
            let source = EventSource::Element(item);
            for kind in [
                EventKind::MouseEnter,
                EventKind::MouseLeave,
                EventKind::TouchStart,
                EventKind::TouchMove,
                EventKind::TouchEnd,
            ] {
                self.installed.image_pans.push(self.events.register(source, kind, Handler::PanImage { image }));
            }
        }
    }

    fn init_lazy_loading(&mut self) {
        self.events.deregister_all(&self.installed.lazy_images);
        self.installed.lazy_images.clear();
        self.lazy_images = reveal::lazy_image_observer(&self.document);
        if self.lazy_images.is_empty() {
            return;
        }
        reveal::load_visible_images(&mut self.document, &mut self.lazy_images);
        self.installed.lazy_images.push(self.events.register(
            EventSource::Window,
            EventKind::Scroll,
            Handler::LazyLoadOnScroll,
        ));
    }

    fn init_language(&mut self) {
        self.events.deregister_all(&self.installed.language);
        self.installed.language = self
            .document
            .query_class(LANGUAGE_TOGGLE_CLASS)
            .into_iter()
            .map(|toggle| self.events.register(EventSource::Element(toggle), EventKind::Click, Handler::ToggleLanguage))
            .collect();
        self.localizer.restore_saved(&mut self.document, &self.preferences);
    }

    /// Switch to the other locale and persist it.
    pub fn toggle_language(&mut self) -> Locale {
        self.localizer.toggle_language(&mut self.document, &mut self.preferences)
    }

    /// Make `locale` active and persist it.
    pub fn set_locale(&mut self, locale: Locale) {
        self.localizer.set_locale(&mut self.document, &mut self.preferences, locale);
    }

    /// Fade out, then move to `url` once the transition has run.
    pub fn navigate_with_transition(&mut self, url: &str) {
        navigation::begin_page_transition(&mut self.document);
        self.scheduler.set_timeout(
            self.config.page_transition,
            TimerTask::FinishNavigation { url: url.to_string() },
        );
    }

    pub fn click(&mut self, node: NodeId) {
        self.dispatch(Event::Click(node));
    }

    /// Scroll the window to `y` and notify scroll listeners.
    pub fn scroll_to(&mut self, y: f64) {
        self.document.set_scroll_y(y);
        self.dispatch(Event::Scroll);
    }

    /// Deliver an event: target first, then each ancestor, then the
    /// document and window. A handler returning [`Propagation::Stop`]
    /// lets the remaining listeners on the same node run, but nothing
    /// further out.
    pub fn dispatch(&mut self, event: Event) {
        let kind = event.kind();
        for (source, current) in self.propagation_path(&event) {
            let mut propagation = Propagation::Continue;
            for handler in self.events.handlers_for(source, kind) {
                if self.handle(&handler, &event, current) == Propagation::Stop {
                    propagation = Propagation::Stop;
                }
            }
            if propagation == Propagation::Stop {
                debug!(?kind, ?source, "propagation stopped");
                break;
            }
        }
    }

    fn propagation_path(&self, event: &Event) -> Vec<(EventSource, Option<NodeId>)> {
        let Some(target) = event.target() else {
            return match event.kind() {
                EventKind::Scroll => vec![(EventSource::Window, None)],
                _ => vec![(EventSource::Document, None), (EventSource::Window, None)],
            };
        };
        if !event.bubbles() {
            return vec![(EventSource::Element(target), Some(target))];
        }
        let mut path: Vec<(EventSource, Option<NodeId>)> = self
            .document
            .ancestors_inclusive(target)
            .into_iter()
            .map(|node| (EventSource::Element(node), Some(node)))
            .collect();
        path.push((EventSource::Document, None));
        path.push((EventSource::Window, None));
        path
    }

    fn handle(&mut self, handler: &Handler, event: &Event, current: Option<NodeId>) -> Propagation {
        match handler {
            Handler::ToggleMobileMenu => {
                self.menu.toggle(&mut self.document);
                return Propagation::Stop;
            }
            Handler::CloseMenuOnOutsideClick => {
                if let Some(target) = event.target() {
                    self.menu.close_if_outside(&mut self.document, target);
                }
            }
            Handler::CloseMenuOnLinkClick => self.menu.close(&mut self.document),
            Handler::CloseMenuOnEscape => {
                if let Event::KeyDown(key) = event {
                    self.menu.close_on_key(&mut self.document, key);
                }
            }
            Handler::StyleNavbarOnScroll => theme::style_navbar(&mut self.document, self.config.navbar_scroll_threshold),
            Handler::SelectSlide(index) => {
                if let Some(binding) = self.carousel.as_mut() {
                    binding.controller.select(&mut self.document, *index);
                }
            }
            Handler::SelectTab => {
                if let (Some(filter), Some(button)) = (&self.tabs, current) {
                    filter.activate(&mut self.document, button);
                }
            }
            Handler::ToggleTheme => {
                if let Some(controller) = &self.theme {
                    controller.toggle(&mut self.document, &mut self.preferences);
                    self.scheduler.set_timeout(self.config.theme_transition, TimerTask::EndThemeTransition);
                }
            }
            Handler::ToggleLanguage => {
                self.toggle_language();
            }
            Handler::ScrollToAnchor => {
                let offset = self.config.anchor_offset;
                let scrolled = current.and_then(|link| navigation::scroll_to_anchor(&mut self.document, link, offset));
                if scrolled.is_some() {
                    self.dispatch(Event::Scroll);
                }
            }
            Handler::SubmitContactForm => {
                if let Some(form) = current {
                    self.submit_contact_form(form);
                }
            }
            Handler::RevealOnScroll => {
                reveal::reveal(&mut self.document, &mut self.reveal);
            }
            Handler::LazyLoadOnScroll => {
                reveal::load_visible_images(&mut self.document, &mut self.lazy_images);
            }
            Handler::LiftCard(lift) => {
                if let Some(card) = current {
                    match event {
                        Event::MouseEnter(_) => lift.apply(&mut self.document, card, true),
                        Event::MouseLeave(_) => lift.apply(&mut self.document, card, false),
                        _ => {}
                    }
                }
            }
            Handler::PanImage { image } => self.pan_image(*image, event),
        }
        Propagation::Continue
    }

    fn submit_contact_form(&mut self, form: NodeId) {
        let enquiry = Enquiry::from_form(&self.document, form);
        let uri = enquiry.mailto_uri(&self.config.contact_recipient);
        if let Some(button) = contact::submit_button(&self.document, form) {
            let label = self.document.text_content(button);
            self.document.set_text_content(button, SUBMIT_FEEDBACK_LABEL);
            self.scheduler
                .set_timeout(self.config.submit_feedback, TimerTask::RestoreButtonLabel { button, label });
        }
        info!(service = %enquiry.service, "handing enquiry to mail client");
        self.document.set_location(&uri);
    }

    fn pan_image(&mut self, image: NodeId, event: &Event) {
        match event {
            Event::MouseEnter(_) => effects::pan_image(&mut self.document, image, PanPosition::Bottom, 6),
            Event::MouseLeave(_) => effects::pan_image(&mut self.document, image, PanPosition::Top, 2),
            Event::TouchStart(_, y) => self.touch_pans.start(image, *y),
            Event::TouchMove(_, y) => {
                self.touch_pans.drag(&mut self.document, image, *y);
            }
            Event::TouchEnd(_) => {
                if self.touch_pans.end(image) {
                    self.scheduler
                        .set_timeout(self.config.touch_pan_reset, TimerTask::ResetImagePan { image });
                }
            }
            _ => {}
        }
    }

    /// Let `elapsed` of virtual time pass, firing due timers in order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.settle(until);
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::AdvanceCarousel => {
                if let Some(binding) = self.carousel.as_mut() {
                    binding.controller.tick(&mut self.document);
                }
            }
            TimerTask::EndThemeTransition => theme::end_transition(&mut self.document),
            TimerTask::RestoreButtonLabel { button, label } => self.document.set_text_content(button, &label),
            TimerTask::FinishNavigation { url } => {
                debug!(%url, "navigating");
                self.document.set_location(&url);
            }
            TimerTask::ResetImagePan { image } => {
                effects::pan_image(&mut self.document, image, PanPosition::Top, 2);
            }
        }
    }

    /// Drive the timers from the tokio clock for `duration`, sleeping
    /// until each deadline in turn.
    pub async fn run_for(&mut self, duration: Duration) {
        let end = self.scheduler.now() + duration;
        loop {
            let now = self.scheduler.now();
            let next = self.scheduler.next_deadline().filter(|due| *due <= end).unwrap_or(end);
            let wait = next.saturating_sub(now);
            tokio::time::sleep(wait).await;
            self.advance(wait);
            if next >= end {
                break;
            }
        }
    }
}
