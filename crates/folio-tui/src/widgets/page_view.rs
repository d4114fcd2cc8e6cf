use folio_core::dom::Viewport;
use folio_core::storage::Storage;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use super::{truncate_str, wrap_text};
use crate::app::App;

/// Gutter drawn beside the current section
const CURRENT_MARK: &str = "▌ ";
const GUTTER: &str = "  ";

/// The scrolled document: one terminal row per `px_per_row` pixels
pub struct PageViewWidget;

impl PageViewWidget {
    pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let sections = app.section_views();
        let text_width = area.width.saturating_sub(GUTTER.len() as u16 + 1) as usize;
        let bodies: Vec<Vec<String>> = sections.iter().map(|s| wrap_text(&s.body, text_width)).collect();

        let current = app.page.current_section();
        let scroll_y = app.page.host().scroll_y();
        let px = app.px_per_row();

        for row in 0..area.height {
            let y = scroll_y + f64::from(row) * px;
            let Some(pos) = sections.iter().position(|s| y >= s.top && y < s.bottom) else {
                continue;
            };
            let section = &sections[pos];
            let bg = theme.section_bg(section.index);
            let is_current = current == Some(section.id.as_str());

            let gutter = if is_current {
                Span::styled(CURRENT_MARK, Style::default().fg(theme.accent).bg(bg))
            } else {
                Span::styled(GUTTER, Style::default().bg(bg))
            };

            // rows are counted from the section's first row on screen
            let line_index = ((y - section.top) / px).floor() as usize;
            let content = match line_index {
                0 => Line::from(vec![
                    gutter,
                    Span::styled(
                        truncate_str(&section.title, text_width),
                        Style::default().fg(theme.fg1).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  #{}", section.id), Style::default().fg(theme.grey1)),
                ]),
                1 => Line::from(gutter),
                n => match bodies[pos].get(n - 2) {
                    Some(text) => Line::from(vec![gutter, Span::styled(text.clone(), Style::default().fg(theme.fg0))]),
                    None => Line::from(gutter),
                },
            };

            frame.render_widget(
                Paragraph::new(content).style(Style::default().bg(bg)),
                Rect::new(area.x, area.y + row, area.width, 1),
            );
        }
    }
}
