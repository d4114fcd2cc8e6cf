use crossterm::event::{MouseEvent, MouseEventKind};
use folio_core::dom::{offset_top, Document, ElementId, History, Viewport, VirtualDocument};
use folio_core::storage::Storage;
use folio_core::{AppConfig, NavigationEvent, Page, PageEvent};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::input::Action;
use crate::keymap::Keymap;
use crate::theme::Theme;
use crate::widgets::{MenuWidget, NavbarWidget};

/// Preference key holding the id of the last visited section
pub const LAST_SECTION_KEY: &str = "last_section";

/// Rows scrolled by one mouse wheel notch
const WHEEL_ROWS: f64 = 3.0;

/// A section as the page view draws it, in document order
#[derive(Debug, Clone)]
pub struct SectionView {
    pub id: String,
    pub element: ElementId,
    pub title: String,
    pub body: String,
    /// Document-coordinate span
    pub top: f64,
    pub bottom: f64,
    /// Position among the drawn sections
    pub index: usize,
}

/// Terminal preview state
pub struct App<S: Storage> {
    pub page: Page<VirtualDocument>,
    pub config: AppConfig,
    pub theme: Theme,
    pub keymap: Keymap,
    pub status_message: Option<String>,
    pub should_quit: bool,
    storage: S,
    events: mpsc::UnboundedReceiver<NavigationEvent>,
    /// Terminal cells the page is drawn into (everything but the status bar)
    page_area: Rect,
}

impl<S: Storage> App<S> {
    /// Attach the page controllers to `doc` and restore the last visited section
    pub fn new(doc: VirtualDocument, config: AppConfig, storage: S) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let page = Page::with_event_sender(doc, &config, tx);
        let keymap = Keymap::from_config(&config.keymap);

        let mut app = Self {
            page,
            config,
            theme: Theme::default(),
            keymap,
            status_message: None,
            should_quit: false,
            storage,
            events,
            page_area: Rect::default(),
        };
        app.restore_last_section();
        app
    }

    fn restore_last_section(&mut self) {
        let Some(id) = self.storage.get::<Option<String>>(LAST_SECTION_KEY, None) else {
            return;
        };
        if self.page.section(&id).is_none() {
            debug!(id = %id, "Stored section no longer exists");
            return;
        }
        if self.page.navigate_to(&id, false) {
            info!(id = %id, "Restored last visited section");
            self.status_message = Some(format!("Restored #{id}"));
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn page_area(&self) -> Rect {
        self.page_area
    }

    pub fn status_area(&self) -> Rect {
        Rect {
            x: self.page_area.x,
            y: self.page_area.bottom(),
            width: self.page_area.width,
            height: 1,
        }
    }

    pub fn px_per_row(&self) -> f64 {
        self.config.ui.px_per_row.max(1.0)
    }

    pub fn px_per_col(&self) -> f64 {
        self.config.ui.px_per_col.max(1.0)
    }

    /// Map the terminal size onto the page viewport; the last row is the status bar
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.page_area = Rect::new(0, 0, cols, rows.saturating_sub(1));
        let width = f64::from(cols) * self.px_per_col();
        let height = f64::from(self.page_area.height) * self.px_per_row();
        self.page.host_mut().set_viewport_size(width, height);
        self.page.dispatch(PageEvent::Resize { width, height });
    }

    /// Whether the page is laid out for narrow screens
    pub fn is_mobile(&self) -> bool {
        self.page.host().inner_width() <= self.config.navbar.mobile_breakpoint
    }

    /// Terminal rows covered by the fixed navbar
    pub fn navbar_rows(&self) -> u16 {
        let height = self
            .page
            .navbar()
            .navbar()
            .and_then(|navbar| self.page.host().bounding_rect(navbar))
            .map(|rect| rect.height)
            .unwrap_or(0.0);
        ((height / self.px_per_row()).ceil() as u16).clamp(1, self.page_area.height.max(1))
    }

    pub fn navbar_area(&self) -> Rect {
        Rect {
            height: self.navbar_rows().min(self.page_area.height),
            ..self.page_area
        }
    }

    /// Document y at the top edge of a terminal row
    pub fn y_at_row(&self, row: u16) -> f64 {
        let offset = f64::from(row.saturating_sub(self.page_area.y));
        self.page.host().scroll_y() + offset * self.px_per_row()
    }

    /// Sections currently in the document, ordered by position
    pub fn section_views(&self) -> Vec<SectionView> {
        let host = self.page.host();
        let mut views: Vec<SectionView> = self
            .page
            .navigation()
            .sections()
            .filter_map(|section| {
                let top = offset_top(host, section.element)?;
                let height = host.bounding_rect(section.element)?.height;
                Some(SectionView {
                    id: section.id.clone(),
                    element: section.element,
                    title: host
                        .attribute(section.element, "data-title")
                        .unwrap_or_else(|| section.id.clone()),
                    body: host.text(section.element).unwrap_or_default().to_string(),
                    top,
                    bottom: top + height,
                    index: 0,
                })
            })
            .collect();
        views.sort_by(|a, b| a.top.total_cmp(&b.top));
        for (index, view) in views.iter_mut().enumerate() {
            view.index = index;
        }
        views
    }

    pub fn handle_action(&mut self, action: Action) {
        if action != Action::None {
            self.status_message = None;
        }
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.scroll_by(self.px_per_row()),
            Action::ScrollUp => self.scroll_by(-self.px_per_row()),
            Action::PageDown => self.scroll_by(self.page.host().inner_height() / 2.0),
            Action::PageUp => self.scroll_by(-self.page.host().inner_height() / 2.0),
            Action::ToggleMenu => self.page.toggle_menu(),
            Action::CloseMenu => self.page.close_menu(),
            Action::PageKey(input) => {
                if !self.page.dispatch(PageEvent::Key(input)) {
                    debug!(?input, "Key not handled by the page");
                }
            }
            Action::None => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_ROWS * self.px_per_row()),
            MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_ROWS * self.px_per_row()),
            MouseEventKind::Down(_) => self.click(mouse.column, mouse.row),
            _ => {}
        }
    }

    /// User scroll, reported to the page like a browser scroll event
    pub fn scroll_by(&mut self, dy: f64) {
        self.page.host_mut().scroll_by(dy);
        self.page.dispatch(PageEvent::Scroll);
    }

    /// Click the element drawn at a terminal cell
    pub fn click(&mut self, column: u16, row: u16) {
        if let Some(target) = self.element_at(column, row) {
            let consumed = self.page.dispatch(PageEvent::Click { target });
            debug!(column, row, consumed, "Click");
        }
    }

    /// Topmost element drawn at a terminal cell: menu, navbar, then page content
    pub fn element_at(&self, column: u16, row: u16) -> Option<ElementId> {
        if !self.page_area.contains((column, row).into()) {
            return None;
        }
        let navbar_area = self.navbar_area();
        if let Some(target) = MenuWidget::target_at(self, navbar_area, column, row) {
            return Some(target);
        }
        if navbar_area.contains((column, row).into()) {
            return NavbarWidget::target_at(self, navbar_area, column, row).or_else(|| self.page.navbar().navbar());
        }

        let y = self.y_at_row(row);
        let section = self
            .section_views()
            .into_iter()
            .find(|view| y >= view.top && y < view.bottom)
            .map(|view| view.element);
        Some(section.unwrap_or_else(|| self.page.host().body()))
    }

    /// Advance one frame and collect section changes
    pub fn tick(&mut self) {
        self.page.tick();
        self.drain_events();
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                NavigationEvent::SectionChanged { section_id, .. } => {
                    debug!(section = %section_id, url = %self.page.host().location(), "Section changed");
                    self.storage.set(LAST_SECTION_KEY, &section_id);
                }
            }
        }
    }

    /// Poll faster while an animation or timer is pending
    pub fn needs_fast_update(&self) -> bool {
        self.page.navigation().is_busy()
    }
}
