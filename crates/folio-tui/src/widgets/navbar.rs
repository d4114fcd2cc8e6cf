use folio_core::dom::{Document, ElementId};
use folio_core::navbar::{OPEN_CLASS, SCROLLED_CLASS};
use folio_core::storage::Storage;
use folio_core::tracker::ACTIVE_CLASS;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{truncate_str, NavItem};
use crate::app::App;

const TOGGLE_LABEL: &str = "≡";

pub struct NavbarWidget;

impl NavbarWidget {
    /// Clickable items in drawing order: the menu toggle on narrow pages,
    /// otherwise every nav link that fits
    pub fn items<S: Storage>(app: &App<S>, area: Rect) -> Vec<NavItem> {
        let host = app.page.host();

        if app.is_mobile() {
            let Some(toggle) = host.query_one("#navbar-toggle") else {
                return Vec::new();
            };
            let width = TOGGLE_LABEL.width() as u16 + 2;
            if area.width <= width {
                return Vec::new();
            }
            return vec![NavItem {
                rect: Rect::new(area.right() - width - 1, area.y, width, area.height),
                label: TOGGLE_LABEL.to_string(),
                element: toggle,
            }];
        }

        let mut x = area.x + brand(app).width() as u16 + 4;
        let mut items = Vec::new();
        for (label, element) in nav_links(app) {
            let width = label.width() as u16 + 2;
            if x + width > area.right() {
                break;
            }
            items.push(NavItem {
                rect: Rect::new(x, area.y, width, area.height),
                label,
                element,
            });
            x += width + 1;
        }
        items
    }

    pub fn target_at<S: Storage>(app: &App<S>, area: Rect, column: u16, row: u16) -> Option<ElementId> {
        Self::items(app, area)
            .into_iter()
            .find(|item| item.rect.contains((column, row).into()))
            .map(|item| item.element)
    }

    pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>) {
        let theme = &app.theme;
        let host = app.page.host();
        let scrolled = app
            .page
            .navbar()
            .navbar()
            .is_some_and(|navbar| host.has_class(navbar, SCROLLED_CLASS));
        let bg = if scrolled { theme.scrolled } else { theme.bg1 };

        frame.render_widget(Block::default().style(Style::default().bg(bg)), area);
        if area.height == 0 {
            return;
        }
        let mid = area.y + (area.height - 1) / 2;

        let brand = truncate_str(&brand(app), area.width.saturating_sub(2) as usize);
        frame.render_widget(
            Paragraph::new(brand.clone()).style(Style::default().fg(theme.fg1).bg(bg).add_modifier(Modifier::BOLD)),
            Rect::new(area.x + 2, mid, (brand.width() as u16).min(area.width.saturating_sub(2)), 1),
        );

        for item in Self::items(app, area) {
            let highlighted = host.has_class(item.element, ACTIVE_CLASS) || host.has_class(item.element, OPEN_CLASS);
            let style = if highlighted {
                Style::default()
                    .fg(theme.accent)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.fg0).bg(bg)
            };
            frame.render_widget(
                Paragraph::new(format!(" {} ", item.label)).style(style),
                Rect::new(item.rect.x, mid, item.rect.width, 1),
            );
        }
    }
}

fn brand<S: Storage>(app: &App<S>) -> String {
    app.page
        .navbar()
        .navbar()
        .and_then(|navbar| app.page.host().text(navbar))
        .unwrap_or_default()
        .to_string()
}

/// Every element matching the link selector with its display label
pub(super) fn nav_links<S: Storage>(app: &App<S>) -> Vec<(String, ElementId)> {
    let host = app.page.host();
    host.query_all(&app.config.navigation.link_selector)
        .into_iter()
        .map(|link| {
            let label = host
                .text(link)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .or_else(|| host.attribute(link, "href"))
                .unwrap_or_default();
            (label, link)
        })
        .collect()
}
