use folio_core::dom::{History, Viewport};
use folio_core::storage::Storage;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render<S: Storage>(frame: &mut Frame, area: Rect, app: &App<S>) {
        let theme = &app.theme;
        let host = app.page.host();

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {msg}")
        } else {
            let location = match host.location().fragment() {
                Some(fragment) => format!("#{fragment}"),
                None => host.location().path().to_string(),
            };
            let motion = if app.page.navigation().is_animating() {
                " | scrolling"
            } else {
                ""
            };
            format!(
                " {} | {} | y {:.0}/{:.0}{}",
                app.page.current_section().unwrap_or("-"),
                location,
                host.scroll_y(),
                host.max_scroll(),
                motion
            )
        };

        let help_hint = format!(
            " q:quit j/k:scroll m:menu {:?}+\u{2191}\u{2193}/Home/End:sections ",
            app.config.keyboard.modifier
        );
        let padding_len = (area.width as usize).saturating_sub(status_text.width() + help_hint.width());

        let style = if app.status_message.is_some() {
            Style::default().fg(theme.warning).bg(theme.bg2)
        } else {
            Style::default().fg(theme.fg0).bg(theme.bg2)
        };

        let line = Line::from(vec![
            Span::styled(status_text, style),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg2)), area);
    }
}
