//! A host plus the controllers attached to it
//!
//! `Page` is the event router: the embedder reports scrolls, resizes,
//! clicks and key presses as [`PageEvent`]s and calls [`Page::tick`] once
//! per frame.

use tokio::sync::mpsc;
use tracing::debug;

use crate::config::AppConfig;
use crate::dom::{ElementId, Host};
use crate::keyboard::KeyInput;
use crate::navbar::NavbarController;
use crate::navigation::{NavigationController, NavigationEvent};
use crate::registry::Section;

/// Input reported by the embedder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    /// The scroll position changed (by the user or the host)
    Scroll,
    /// The viewport was resized; the host already reports the new size
    Resize { width: f64, height: f64 },
    Click { target: ElementId },
    Key(KeyInput),
}

pub struct Page<H: Host> {
    host: H,
    navigation: NavigationController,
    navbar: NavbarController,
}

impl<H: Host> Page<H> {
    /// Attach both controllers to `host` and initialize them
    pub fn new(host: H, config: &AppConfig) -> Self {
        Self::with_navigation(host, config, NavigationController::new(config))
    }

    /// Like `new`, forwarding section changes to `tx`
    pub fn with_event_sender(host: H, config: &AppConfig, tx: mpsc::UnboundedSender<NavigationEvent>) -> Self {
        Self::with_navigation(host, config, NavigationController::new(config).with_event_sender(tx))
    }

    fn with_navigation(mut host: H, config: &AppConfig, mut navigation: NavigationController) -> Self {
        let mut navbar = NavbarController::new(&config.navbar, &config.navigation.link_selector);
        navbar.init(&mut host);
        navigation.init(&mut host);
        Self {
            host,
            navigation,
            navbar,
        }
    }

    /// Route an event; returns true when it was consumed (default prevented)
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        match event {
            PageEvent::Scroll => {
                self.navbar.on_scroll(&mut self.host);
                self.navigation.handle_scroll(&self.host);
                false
            }
            PageEvent::Resize { width, height } => {
                debug!(width, height, "Resize");
                self.navbar.on_resize(&mut self.host, width);
                self.navigation.handle_resize(&mut self.host);
                false
            }
            PageEvent::Click { target } => {
                self.navbar.handle_click(&mut self.host, target);
                self.navigation.handle_link_click(&mut self.host, target)
            }
            PageEvent::Key(input) => self.navigation.handle_key(&mut self.host, &input),
        }
    }

    /// Advance one frame; returns true when an animation moved the page
    pub fn tick(&mut self) -> bool {
        let moved = self.navigation.tick(&mut self.host);
        if moved {
            self.navbar.on_scroll(&mut self.host);
        }
        moved
    }

    pub fn navigate_to(&mut self, id: &str, smooth: bool) -> bool {
        self.navigation.navigate_to(&mut self.host, id, smooth)
    }

    pub fn add_section(&mut self, id: &str, element: ElementId) -> bool {
        self.navigation.add_section(&mut self.host, id, element)
    }

    pub fn remove_section(&mut self, id: &str) {
        self.navigation.remove_section(&mut self.host, id);
    }

    pub fn toggle_menu(&mut self) {
        self.navbar.toggle_menu(&mut self.host);
    }

    pub fn close_menu(&mut self) {
        self.navbar.close_menu(&mut self.host);
    }

    pub fn current_section(&self) -> Option<&str> {
        self.navigation.current_section()
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.navigation.section(id)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access for embedder-side changes (scrolling, resizing,
    /// inserting content); report them with `dispatch` afterwards
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn navbar(&self) -> &NavbarController {
        &self.navbar
    }

    /// Detach the controllers and hand the host back
    pub fn teardown(mut self) -> H {
        self.navbar.teardown(&mut self.host);
        self.navigation.teardown(&mut self.host);
        self.host
    }
}
