//! Navbar chrome: the mobile menu and the `scrolled` style flag

use tracing::debug;

use crate::config::NavbarConfig;
use crate::dom::{add_class, remove_class, Document, ElementId, Viewport};

/// Set on the menu and toggle button while the menu is open
pub const OPEN_CLASS: &str = "active";
/// Set on `body` while the menu is open
pub const MENU_OPEN_CLASS: &str = "menu-open";
/// Set on the navbar once the page is scrolled past the threshold
pub const SCROLLED_CLASS: &str = "scrolled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Toggle,
    OutsideClick,
    LinkClick,
    ResizeAboveBreakpoint,
}

impl MenuState {
    /// Toggle flips; every other event closes
    pub fn on(self, event: MenuEvent) -> MenuState {
        match (self, event) {
            (MenuState::Closed, MenuEvent::Toggle) => MenuState::Open,
            _ => MenuState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }
}

#[derive(Debug, Clone)]
pub struct NavbarController {
    config: NavbarConfig,
    link_selector: String,
    navbar: Option<ElementId>,
    toggle: Option<ElementId>,
    menu: Option<ElementId>,
    body: Option<ElementId>,
    links: Vec<ElementId>,
    state: MenuState,
    scrolled: bool,
}

impl NavbarController {
    pub fn new(config: &NavbarConfig, link_selector: &str) -> Self {
        Self {
            config: config.clone(),
            link_selector: link_selector.to_string(),
            navbar: None,
            toggle: None,
            menu: None,
            body: None,
            links: Vec::new(),
            state: MenuState::Closed,
            scrolled: false,
        }
    }

    /// Look up the navbar elements; any of them may be missing
    pub fn init<H: Document + Viewport>(&mut self, host: &mut H) {
        self.navbar = host.query_one(".navbar");
        self.toggle = host.query_one("#navbar-toggle");
        self.menu = host.query_one("#navbar-menu");
        self.body = host.query_one("body");
        self.links = host.query_all(&self.link_selector);
        self.on_scroll(host);
        debug!(
            navbar = self.navbar.is_some(),
            toggle = self.toggle.is_some(),
            links = self.links.len(),
            "Navbar initialized"
        );
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_menu_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn navbar(&self) -> Option<ElementId> {
        self.navbar
    }

    pub fn toggle_menu<D: Document>(&mut self, doc: &mut D) {
        self.apply(doc, MenuEvent::Toggle);
    }

    pub fn close_menu<D: Document>(&mut self, doc: &mut D) {
        self.apply(doc, MenuEvent::OutsideClick);
    }

    /// Route a click to the toggle, a link, or the outside-click rule
    pub fn handle_click<D: Document>(&mut self, doc: &mut D, target: ElementId) {
        let inside = |element: Option<ElementId>| element.is_some_and(|e| doc.contains(e, target));
        let event = if inside(self.toggle) {
            MenuEvent::Toggle
        } else if self.links.iter().any(|&link| doc.contains(link, target)) {
            MenuEvent::LinkClick
        } else if !inside(self.navbar) {
            MenuEvent::OutsideClick
        } else {
            return;
        };
        self.apply(doc, event);
    }

    pub fn on_resize<D: Document>(&mut self, doc: &mut D, width: f64) {
        if width > self.config.mobile_breakpoint {
            self.apply(doc, MenuEvent::ResizeAboveBreakpoint);
        }
    }

    pub fn on_scroll<H: Document + Viewport>(&mut self, host: &mut H) {
        let scrolled = host.scroll_y() > self.config.scrolled_threshold;
        if scrolled {
            add_class(host, self.navbar, SCROLLED_CLASS);
        } else {
            remove_class(host, self.navbar, SCROLLED_CLASS);
        }
        self.scrolled = scrolled;
    }

    /// Close the menu and drop the navbar's state classes
    pub fn teardown<D: Document>(&mut self, doc: &mut D) {
        self.close_menu(doc);
        remove_class(doc, self.navbar, SCROLLED_CLASS);
        self.scrolled = false;
    }

    fn apply<D: Document>(&mut self, doc: &mut D, event: MenuEvent) {
        let next = self.state.on(event);
        if next == self.state {
            return;
        }
        debug!(?event, from = ?self.state, to = ?next, "Menu transition");
        self.state = next;

        if next.is_open() {
            add_class(doc, self.menu, OPEN_CLASS);
            add_class(doc, self.toggle, OPEN_CLASS);
            add_class(doc, self.body, MENU_OPEN_CLASS);
        } else {
            remove_class(doc, self.menu, OPEN_CLASS);
            remove_class(doc, self.toggle, OPEN_CLASS);
            remove_class(doc, self.body, MENU_OPEN_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{PageLayout, VirtualDocument};

    const PAGE: &str = r##"
        title = "x"
        [navbar]
        brand = "MS"
        links = [{ label = "About", href = "#about" }]
        [[sections]]
        id = "home"
        title = "Home"
        height = 2000
    "##;

    fn setup() -> (VirtualDocument, NavbarController) {
        let mut doc = PageLayout::from_toml(PAGE).unwrap().build().unwrap();
        let mut navbar = NavbarController::new(&NavbarConfig::default(), ".nav-link");
        navbar.init(&mut doc);
        (doc, navbar)
    }

    #[test]
    fn test_transitions() {
        use MenuEvent::*;
        assert_eq!(MenuState::Closed.on(Toggle), MenuState::Open);
        assert_eq!(MenuState::Open.on(Toggle), MenuState::Closed);
        for event in [OutsideClick, LinkClick, ResizeAboveBreakpoint] {
            assert_eq!(MenuState::Open.on(event), MenuState::Closed);
            assert_eq!(MenuState::Closed.on(event), MenuState::Closed);
        }
    }

    #[test]
    fn test_toggle_sets_classes() {
        let (mut doc, mut navbar) = setup();
        let toggle = doc.query_one("#navbar-toggle").unwrap();
        let menu = doc.query_one("#navbar-menu").unwrap();
        let body = doc.body();

        navbar.handle_click(&mut doc, toggle);
        assert!(navbar.is_menu_open());
        assert!(doc.has_class(menu, OPEN_CLASS));
        assert!(doc.has_class(toggle, OPEN_CLASS));
        assert!(doc.has_class(body, MENU_OPEN_CLASS));

        navbar.handle_click(&mut doc, toggle);
        assert!(!navbar.is_menu_open());
        assert!(!doc.has_class(menu, OPEN_CLASS));
        assert!(!doc.has_class(body, MENU_OPEN_CLASS));
    }

    #[test]
    fn test_closing_clicks() {
        let (mut doc, mut navbar) = setup();
        let nav = doc.query_one(".navbar").unwrap();
        let link = doc.query_one(".nav-link").unwrap();
        let section = doc.query_one("section").unwrap();

        navbar.toggle_menu(&mut doc);
        // clicks on the navbar itself keep the menu open
        navbar.handle_click(&mut doc, nav);
        assert!(navbar.is_menu_open());
        navbar.handle_click(&mut doc, section);
        assert!(!navbar.is_menu_open());

        navbar.toggle_menu(&mut doc);
        navbar.handle_click(&mut doc, link);
        assert!(!navbar.is_menu_open());
    }

    #[test]
    fn test_resize_above_breakpoint_closes() {
        let (mut doc, mut navbar) = setup();
        navbar.toggle_menu(&mut doc);
        navbar.on_resize(&mut doc, 768.0);
        assert!(navbar.is_menu_open());
        navbar.on_resize(&mut doc, 769.0);
        assert!(!navbar.is_menu_open());
    }

    #[test]
    fn test_scrolled_flag() {
        let (mut doc, mut navbar) = setup();
        let nav = navbar.navbar().unwrap();

        doc.scroll_to(50.0);
        navbar.on_scroll(&mut doc);
        assert!(!navbar.is_scrolled());

        doc.scroll_to(51.0);
        navbar.on_scroll(&mut doc);
        assert!(navbar.is_scrolled());
        assert!(doc.has_class(nav, SCROLLED_CLASS));

        navbar.teardown(&mut doc);
        assert!(!doc.has_class(nav, SCROLLED_CLASS));
    }

    #[test]
    fn test_missing_elements_are_tolerated() {
        let mut doc = VirtualDocument::blank();
        let mut navbar = NavbarController::new(&NavbarConfig::default(), ".nav-link");
        navbar.init(&mut doc);
        navbar.toggle_menu(&mut doc);
        assert!(navbar.is_menu_open());
        let body = doc.body();
        navbar.handle_click(&mut doc, body);
        assert!(!navbar.is_menu_open());
    }
}
