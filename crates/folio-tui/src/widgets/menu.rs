use folio_core::dom::{Document, ElementId};
use folio_core::storage::Storage;
use folio_core::tracker::ACTIVE_CLASS;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::navbar::nav_links;
use super::{truncate_str, NavItem};
use crate::app::App;

/// Dropdown of nav links shown under the navbar while the mobile menu is open
pub struct MenuWidget;

impl MenuWidget {
    fn popup_area<S: Storage>(app: &App<S>, navbar_area: Rect, links: usize) -> Option<Rect> {
        if !app.page.navbar().is_menu_open() || !app.is_mobile() {
            return None;
        }
        let page = app.page_area();
        let available = page.bottom().saturating_sub(navbar_area.bottom());
        if available < 3 || page.width < 6 {
            return None;
        }
        let widest = nav_links(app).iter().map(|(label, _)| label.width()).max().unwrap_or(0);
        let width = (widest as u16 + 4).clamp(12, page.width);
        let height = (links as u16 + 2).min(available);
        Some(Rect::new(page.right() - width, navbar_area.bottom(), width, height))
    }

    pub fn items<S: Storage>(app: &App<S>, navbar_area: Rect) -> Vec<NavItem> {
        let links = nav_links(app);
        let Some(popup) = Self::popup_area(app, navbar_area, links.len()) else {
            return Vec::new();
        };
        let inner = Block::default().borders(Borders::ALL).inner(popup);
        links
            .into_iter()
            .take(inner.height as usize)
            .enumerate()
            .map(|(i, (label, element))| NavItem {
                rect: Rect::new(inner.x, inner.y + i as u16, inner.width, 1),
                label,
                element,
            })
            .collect()
    }

    pub fn target_at<S: Storage>(app: &App<S>, navbar_area: Rect, column: u16, row: u16) -> Option<ElementId> {
        Self::items(app, navbar_area)
            .into_iter()
            .find(|item| item.rect.contains((column, row).into()))
            .map(|item| item.element)
    }

    pub fn render<S: Storage>(frame: &mut Frame, navbar_area: Rect, app: &App<S>) {
        let Some(popup) = Self::popup_area(app, navbar_area, nav_links(app).len()) else {
            return;
        };
        let theme = &app.theme;
        let host = app.page.host();

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Block::default()
                .title(" Menu ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent))
                .style(Style::default().bg(theme.bg1)),
            popup,
        );

        for item in Self::items(app, navbar_area) {
            let style = if host.has_class(item.element, ACTIVE_CLASS) {
                Style::default()
                    .fg(theme.accent)
                    .bg(theme.bg2)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg0).bg(theme.bg1)
            };
            let label = truncate_str(&item.label, item.rect.width.saturating_sub(1) as usize);
            frame.render_widget(Paragraph::new(format!(" {label}")).style(style), item.rect);
        }
    }
}
