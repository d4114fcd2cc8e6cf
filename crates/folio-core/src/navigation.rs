//! Section navigation controller
//!
//! Owns the section registry (through the tracker), the scroll animator and
//! the two timers (scroll debounce, post-insert settle delay). The current
//! section id has exactly two writers: scroll-driven recomputation and
//! explicit navigation. Recomputation is suppressed while an animation
//! runs so programmatic scrolling never feeds back into it.
//!
//! The controller holds no reference to the page; every operation takes the
//! host it should act on, and time only advances through [`tick`].
//!
//! [`tick`]: NavigationController::tick

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, KeyboardConfig, NavigationConfig};
use crate::debounce::Debouncer;
use crate::dom::{fragment_target, offset_top, ElementId, History, Host};
use crate::keyboard::{command_for, KeyCommand, KeyInput};
use crate::registry::Section;
use crate::scroll::ScrollAnimator;
use crate::tracker::{ActiveSectionTracker, NavLink};

/// Distances below this are jumped, not animated
const MIN_ANIMATED_DISTANCE: f64 = 0.5;

/// Notifications for collaborators (status bar, analytics, persistence)
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// The current section changed
    SectionChanged { section_id: String, section: Section },
}

pub struct NavigationController {
    config: NavigationConfig,
    keyboard: KeyboardConfig,
    tracker: ActiveSectionTracker,
    animator: ScrollAnimator,
    scroll_debounce: Debouncer,
    settle: Debouncer,
    event_tx: Option<mpsc::UnboundedSender<NavigationEvent>>,
}

impl NavigationController {
    pub fn new(config: &AppConfig) -> Self {
        let navigation = config.navigation.clone();
        Self {
            tracker: ActiveSectionTracker::new(navigation.scroll_offset),
            animator: ScrollAnimator::new(config.scroll.clone()),
            scroll_debounce: Debouncer::new(Duration::from_millis(navigation.scroll_debounce_ms)),
            settle: Debouncer::new(Duration::from_millis(navigation.settle_delay_ms)),
            keyboard: config.keyboard.clone(),
            config: navigation,
            event_tx: None,
        }
    }

    /// Set the sender for section-changed notifications
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<NavigationEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn send_event(&self, event: NavigationEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send navigation event: receiver dropped");
            }
        }
    }

    /// Register the page's sections and links and compute the initial state
    pub fn init<H: Host>(&mut self, host: &mut H) {
        for element in host.query_all(&self.config.section_selector) {
            match host.attribute(element, "id") {
                Some(id) => {
                    self.tracker.register(&*host, &id, element);
                }
                None => warn!(?element, "Section without an id attribute, skipping"),
            }
        }

        let home = self.config.home_section.clone();
        if !self.tracker.registry().contains(&home) {
            if let Some(main) = host.query_one("main") {
                debug!(id = %home, "No home section, registering main instead");
                self.tracker.register(&*host, &home, main);
            }
        }

        for element in host.query_all(&self.config.link_selector) {
            if let Some(href) = host.attribute(element, "href") {
                if let Some(id) = fragment_target(&href) {
                    self.tracker.bind_link(element, id);
                }
            }
        }

        if self.tracker.registry().contains(&home) {
            self.tracker.set_current(host, &home);
        }
        self.tracker.recompute_positions(&*host);
        self.refresh_active(host);

        info!(
            sections = self.tracker.registry().len(),
            links = self.tracker.links().len(),
            current = ?self.tracker.current(),
            "Navigation initialized"
        );
    }

    /// Register a section after load; replaces an existing id in place
    pub fn add_section<H: Host>(&mut self, host: &mut H, id: &str, element: ElementId) -> bool {
        if !self.tracker.register(&*host, id, element) {
            return false;
        }
        self.tracker.recompute_positions(&*host);
        // measure again once the inserted content has settled
        self.settle.trigger(host.now());
        true
    }

    pub fn remove_section<H: Host>(&mut self, host: &mut H, id: &str) {
        let was_current = self.tracker.current() == Some(id);
        if self.tracker.unregister(id).is_none() {
            debug!(id, "Removing unknown section ignored");
            return;
        }
        if was_current {
            self.tracker.sync_links(host);
        }
    }

    /// Scroll to a section, animated when `smooth` and enabled
    ///
    /// Returns false, logging a warning, when the id is unknown or its
    /// element has left the document. Nothing changes in that case.
    pub fn navigate_to<H: Host>(&mut self, host: &mut H, id: &str, smooth: bool) -> bool {
        let Some(section) = self.tracker.registry().get(id) else {
            warn!(id, "Section not found");
            return false;
        };
        let Some(top) = offset_top(&*host, section.element) else {
            warn!(id, "Section element is no longer in the document");
            return false;
        };

        let target = top - self.config.scroll_offset;
        let from = host.scroll_y();
        let animate = smooth
            && self.animator.config().is_smooth()
            && (target - from).abs() >= MIN_ANIMATED_DISTANCE;

        if animate {
            self.scroll_debounce.cancel();
            self.animator.start(from, target);
        } else {
            self.animator.cancel();
            host.scroll_to(target);
        }
        debug!(id, from, target, animate, "Navigating");

        if self.tracker.set_current(host, id) {
            self.emit_changed(id);
        }
        self.update_url(host, id);
        true
    }

    pub fn go_to_next<H: Host>(&mut self, host: &mut H) -> bool {
        self.go(host, KeyCommand::Next)
    }

    pub fn go_to_previous<H: Host>(&mut self, host: &mut H) -> bool {
        self.go(host, KeyCommand::Previous)
    }

    fn go<H: Host>(&mut self, host: &mut H, command: KeyCommand) -> bool {
        let registry = self.tracker.registry();
        let current = self.tracker.current();
        let target = match command {
            KeyCommand::Previous => registry.previous_before(current),
            KeyCommand::Next => registry.next_after(current),
            KeyCommand::First => registry.first(),
            KeyCommand::Last => registry.last(),
        };
        match target.map(str::to_string) {
            Some(id) => self.navigate_to(host, &id, true),
            None => false,
        }
    }

    /// Modifier + Up/Down/Home/End; true when the key was consumed
    pub fn handle_key<H: Host>(&mut self, host: &mut H, input: &KeyInput) -> bool {
        let Some(command) = command_for(input, &self.keyboard) else {
            return false;
        };
        self.go(host, command);
        true
    }

    /// Click on (or inside) a bound link; true when the click was consumed
    pub fn handle_link_click<H: Host>(&mut self, host: &mut H, target: ElementId) -> bool {
        let Some(link) = self.tracker.link_for(&*host, target) else {
            return false;
        };
        let id = link.section_id.clone();
        if !self.tracker.registry().contains(&id) {
            warn!(id = %id, "Link points at an unregistered section");
            return false;
        }
        self.navigate_to(host, &id, true)
    }

    /// Scroll notification; recomputation runs after the debounce window
    pub fn handle_scroll<H: Host>(&mut self, host: &H) {
        if self.animator.is_animating() {
            return;
        }
        self.scroll_debounce.trigger(host.now());
    }

    /// Resize notification; geometry is re-read immediately
    pub fn handle_resize<H: Host>(&mut self, host: &mut H) {
        self.tracker.recompute_positions(&*host);
        if !self.animator.is_animating() {
            self.refresh_active(host);
        }
    }

    /// Advance animation and timers to `host.now()`
    ///
    /// Returns true when the scroll position was moved by an animation frame.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> bool {
        let now = host.now();
        let mut moved = false;

        if let Some(handle) = self.animator.handle() {
            if let Some(frame) = self.animator.step(handle, now) {
                host.scroll_to(frame.position);
                moved = true;
            }
        }

        if self.settle.poll(now) {
            debug!("Re-measuring sections after insert");
            self.tracker.recompute_positions(&*host);
        }

        if self.scroll_debounce.poll(now) && !self.animator.is_animating() {
            self.tracker.recompute_positions(&*host);
            self.refresh_active(host);
        }

        moved
    }

    /// Whether `tick` has pending work (frames or timers)
    pub fn is_busy(&self) -> bool {
        self.animator.is_animating() || self.scroll_debounce.is_pending() || self.settle.is_pending()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn current_section(&self) -> Option<&str> {
        self.tracker.current()
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.tracker.registry().get(id)
    }

    /// Sections in registry order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.tracker.registry().iter()
    }

    pub fn links(&self) -> &[NavLink] {
        self.tracker.links()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Stop animations and timers and forget every section and link
    pub fn teardown<H: Host>(&mut self, host: &mut H) {
        self.animator.cancel();
        self.scroll_debounce.cancel();
        self.settle.cancel();
        self.tracker.clear(host);
        self.event_tx = None;
        info!("Navigation torn down");
    }

    fn refresh_active<H: Host>(&mut self, host: &mut H) {
        if let Some(id) = self.tracker.recompute_active(host) {
            self.update_url(host, &id);
            self.emit_changed(&id);
        }
    }

    fn emit_changed(&self, id: &str) {
        if let Some(section) = self.tracker.registry().get(id) {
            self.send_event(NavigationEvent::SectionChanged {
                section_id: id.to_string(),
                section: section.clone(),
            });
        }
    }

    /// Reflect `id` in the address fragment; the home section has none
    fn update_url<H: History>(&self, host: &mut H, id: &str) {
        let mut url = host.location().clone();
        if id == self.config.home_section {
            url.set_fragment(None);
        } else {
            url.set_fragment(Some(id));
        }
        if &url != host.location() {
            debug!(%url, "Pushing history state");
            host.push_state(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, PageLayout, Viewport, VirtualDocument};
    use crate::keyboard::{Modifiers, NavKey};
    use crate::tracker::ACTIVE_CLASS;
    use std::time::Instant;

    // home 0..800, about 800..1700, projects 1700..2300, contact 2300..3300
    const PAGE: &str = r##"
        title = "Portfolio"
        url = "https://folio.test/index.html"
        [viewport]
        width = 1280
        height = 800
        [navbar]
        links = [
            { label = "Home", href = "#home" },
            { label = "About", href = "#about" },
            { label = "Projects", href = "#projects" },
            { label = "Contact", href = "#contact" },
            { label = "Blog", href = "blog.html" },
        ]
        [[sections]]
        id = "home"
        title = "Home"
        height = 800
        [[sections]]
        id = "about"
        title = "About"
        height = 900
        [[sections]]
        id = "projects"
        title = "Projects"
        height = 600
        [[sections]]
        id = "contact"
        title = "Contact"
        height = 1000
    "##;

    fn page(toml: &str) -> (VirtualDocument, NavigationController, mpsc::UnboundedReceiver<NavigationEvent>) {
        let mut doc = PageLayout::from_toml(toml)
            .unwrap()
            .build()
            .unwrap()
            .with_manual_clock(Instant::now());
        let (tx, rx) = mpsc::unbounded_channel();
        let mut nav = NavigationController::new(&AppConfig::default()).with_event_sender(tx);
        nav.init(&mut doc);
        (doc, nav, rx)
    }

    fn run_for(nav: &mut NavigationController, doc: &mut VirtualDocument, ms: u64) {
        for _ in 0..ms.div_ceil(16) {
            doc.advance(Duration::from_millis(16));
            nav.tick(doc);
        }
    }

    fn changes(rx: &mut mpsc::UnboundedReceiver<NavigationEvent>) -> Vec<String> {
        let mut ids = Vec::new();
        while let Ok(NavigationEvent::SectionChanged { section_id, .. }) = rx.try_recv() {
            ids.push(section_id);
        }
        ids
    }

    fn active_links(doc: &VirtualDocument, nav: &NavigationController) -> Vec<String> {
        nav.links()
            .iter()
            .filter(|link| doc.has_class(link.element, ACTIVE_CLASS))
            .map(|link| link.section_id.clone())
            .collect()
    }

    #[test]
    fn test_init_state() {
        let (doc, nav, mut rx) = page(PAGE);
        assert_eq!(nav.current_section(), Some("home"));
        assert_eq!(nav.sections().count(), 4);
        // fragment links only
        assert_eq!(nav.links().len(), 4);
        assert_eq!(active_links(&doc, &nav), vec!["home"]);
        assert_eq!(doc.history_len(), 1);
        assert!(changes(&mut rx).is_empty());
    }

    #[test]
    fn test_smooth_navigation() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        assert!(nav.navigate_to(&mut doc, "about", true));

        // current changes before the animation completes
        assert_eq!(nav.current_section(), Some("about"));
        assert!(nav.is_animating());
        assert_eq!(doc.location().fragment(), Some("about"));
        assert_eq!(changes(&mut rx), vec!["about"]);

        run_for(&mut nav, &mut doc, 400);
        let midway = doc.scroll_y();
        assert!(midway > 0.0 && midway < 730.0);

        run_for(&mut nav, &mut doc, 600);
        assert!(!nav.is_animating());
        assert_eq!(doc.scroll_y(), 730.0);
        assert_eq!(active_links(&doc, &nav), vec!["about"]);
    }

    #[test]
    fn test_added_section_is_navigable() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        let gallery = doc
            .insert_section("gallery", "Gallery", 500.0, "", Some("about"))
            .unwrap();
        assert!(nav.add_section(&mut doc, "gallery", gallery));
        assert!(nav.navigate_to(&mut doc, "gallery", true));
        assert_eq!(nav.current_section(), Some("gallery"));

        run_for(&mut nav, &mut doc, 1000);
        // gallery starts at 1700 once inserted after about
        assert_eq!(doc.scroll_y(), 1700.0 - 70.0);
        assert_eq!(nav.section("gallery").map(|s| s.top), Some(1700.0));
        assert_eq!(nav.section("projects").map(|s| s.top), Some(2200.0));
        assert_eq!(changes(&mut rx), vec!["gallery"]);
    }

    #[test]
    fn test_unknown_section_changes_nothing() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        assert!(!nav.navigate_to(&mut doc, "nonexistent", true));
        assert_eq!(nav.current_section(), Some("home"));
        assert!(!nav.is_animating());
        assert_eq!(doc.scroll_y(), 0.0);
        assert_eq!(doc.history_len(), 1);
        assert!(changes(&mut rx).is_empty());
    }

    #[test]
    fn test_keyboard_home_end() {
        let three = r##"
            title = "x"
            [[sections]]
            id = "home"
            title = "Home"
            height = 800
            [[sections]]
            id = "about"
            title = "About"
            height = 900
            [[sections]]
            id = "projects"
            title = "Projects"
            height = 1200
        "##;
        let (mut doc, mut nav, _rx) = page(three);

        assert!(nav.handle_key(&mut doc, &KeyInput::with_alt(NavKey::End)));
        assert_eq!(nav.current_section(), Some("projects"));
        run_for(&mut nav, &mut doc, 1000);

        assert!(nav.handle_key(&mut doc, &KeyInput::with_alt(NavKey::ArrowUp)));
        assert_eq!(nav.current_section(), Some("about"));

        assert!(nav.handle_key(&mut doc, &KeyInput::with_alt(NavKey::Home)));
        assert_eq!(nav.current_section(), Some("home"));
        assert_eq!(doc.location().fragment(), None);

        // without the modifier the key is left alone
        let plain = KeyInput::new(NavKey::End, Modifiers::NONE);
        assert!(!nav.handle_key(&mut doc, &plain));
        assert_eq!(nav.current_section(), Some("home"));
    }

    #[test]
    fn test_next_previous_at_edges() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        assert!(!nav.go_to_previous(&mut doc));
        assert!(nav.go_to_next(&mut doc));
        assert_eq!(nav.current_section(), Some("about"));
        nav.navigate_to(&mut doc, "contact", false);
        assert!(!nav.go_to_next(&mut doc));
    }

    #[test]
    fn test_scroll_is_debounced() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        doc.scroll_to(1000.0);
        nav.handle_scroll(&doc);

        doc.advance(Duration::from_millis(5));
        nav.tick(&mut doc);
        assert_eq!(nav.current_section(), Some("home"));

        doc.scroll_to(1010.0);
        nav.handle_scroll(&doc);
        doc.advance(Duration::from_millis(9));
        nav.tick(&mut doc);
        assert_eq!(nav.current_section(), Some("home"));

        doc.advance(Duration::from_millis(1));
        nav.tick(&mut doc);
        assert_eq!(nav.current_section(), Some("about"));
        assert_eq!(changes(&mut rx), vec!["about"]);
        assert_eq!(doc.location().fragment(), Some("about"));
        assert_eq!(active_links(&doc, &nav), vec!["about"]);
    }

    #[test]
    fn test_scroll_ignored_while_animating() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        nav.navigate_to(&mut doc, "contact", true);
        run_for(&mut nav, &mut doc, 400);

        // the probe is over a middle section, but recomputation is suppressed
        nav.handle_scroll(&doc);
        run_for(&mut nav, &mut doc, 32);
        assert_eq!(nav.current_section(), Some("contact"));

        run_for(&mut nav, &mut doc, 600);
        assert_eq!(doc.scroll_y(), 2230.0);
        assert_eq!(changes(&mut rx), vec!["contact"]);
    }

    #[test]
    fn test_resize_keeps_current_while_animating() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        nav.navigate_to(&mut doc, "contact", true);
        run_for(&mut nav, &mut doc, 400);
        let history = doc.history_len();
        let location = doc.location().clone();

        // mid-flight the probe sits over about/projects
        doc.set_viewport_size(900.0, 700.0);
        nav.handle_resize(&mut doc);
        assert!(nav.is_animating());
        assert_eq!(nav.current_section(), Some("contact"));
        assert_eq!(doc.history_len(), history);
        assert_eq!(doc.location(), &location);

        // positions were still re-measured
        assert_eq!(nav.section("contact").map(|s| s.top), Some(2300.0));

        run_for(&mut nav, &mut doc, 600);
        assert!(!nav.is_animating());
        assert_eq!(nav.current_section(), Some("contact"));
        assert_eq!(doc.history_len(), history);
        assert_eq!(changes(&mut rx), vec!["contact"]);
    }

    #[test]
    fn test_new_navigation_supersedes() {
        let (mut doc, mut nav, mut rx) = page(PAGE);
        nav.navigate_to(&mut doc, "contact", true);
        run_for(&mut nav, &mut doc, 300);
        nav.navigate_to(&mut doc, "about", true);
        run_for(&mut nav, &mut doc, 1000);

        assert!(!nav.is_animating());
        assert_eq!(doc.scroll_y(), 730.0);
        assert_eq!(nav.current_section(), Some("about"));
        assert_eq!(changes(&mut rx), vec!["contact", "about"]);
    }

    #[test]
    fn test_instant_navigation() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        nav.navigate_to(&mut doc, "projects", false);
        assert!(!nav.is_animating());
        assert_eq!(doc.scroll_y(), 1630.0);
    }

    #[test]
    fn test_link_clicks() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        let links = doc.query_all(".nav-link");

        assert!(nav.handle_link_click(&mut doc, links[2]));
        assert_eq!(nav.current_section(), Some("projects"));

        // non-fragment links belong to the host
        assert!(!nav.handle_link_click(&mut doc, links[4]));
        let body = doc.body();
        assert!(!nav.handle_link_click(&mut doc, body));
    }

    #[test]
    fn test_remove_current_section() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        let links = doc.query_all(".nav-link");
        nav.navigate_to(&mut doc, "about", false);
        nav.remove_section(&mut doc, "about");

        assert_eq!(nav.current_section(), None);
        assert!(active_links(&doc, &nav).is_empty());
        // the link stays bound but inert
        assert!(!nav.handle_link_click(&mut doc, links[1]));
        nav.remove_section(&mut doc, "about");
    }

    #[test]
    fn test_history_pushed_only_on_change() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        nav.navigate_to(&mut doc, "about", false);
        nav.navigate_to(&mut doc, "about", false);
        assert_eq!(doc.history_len(), 2);

        nav.navigate_to(&mut doc, "home", false);
        assert_eq!(doc.location().as_str(), "https://folio.test/index.html");
        assert_eq!(doc.history_len(), 3);
    }

    #[test]
    fn test_resize_recomputes_immediately() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        doc.scroll_to(400.0);
        // probe 400 + 70 + 400 lands in about
        nav.handle_resize(&mut doc);
        assert_eq!(nav.current_section(), Some("about"));

        doc.set_viewport_size(1280.0, 200.0);
        // probe 400 + 70 + 100 is back in home
        nav.handle_resize(&mut doc);
        assert_eq!(nav.current_section(), Some("home"));
    }

    #[test]
    fn test_home_falls_back_to_main() {
        let page_without_home = r#"
            title = "x"
            [[sections]]
            id = "about"
            title = "About"
            height = 900
        "#;
        let (doc, nav, _rx) = page(page_without_home);
        let main = doc.query_one("main").unwrap();
        assert_eq!(nav.section("home").map(|s| s.element), Some(main));
        assert_eq!(nav.sections().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["about", "home"]);
    }

    #[test]
    fn test_teardown() {
        let (mut doc, mut nav, _rx) = page(PAGE);
        nav.navigate_to(&mut doc, "about", true);
        nav.teardown(&mut doc);
        assert!(!nav.is_animating());
        assert!(!nav.is_busy());
        assert_eq!(nav.current_section(), None);
        assert_eq!(nav.sections().count(), 0);
        assert!(doc.query_all(".active").is_empty());
    }
}
