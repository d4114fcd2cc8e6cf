mod menu;
mod navbar;
mod page_view;
mod status_bar;

pub use menu::MenuWidget;
pub use navbar::NavbarWidget;
pub use page_view::PageViewWidget;
pub use status_bar::StatusBarWidget;

use folio_core::dom::ElementId;
use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// A clickable label drawn for a page element
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub rect: Rect,
    pub label: String,
    pub element: ElementId,
}

/// Word-wrap respecting unicode character widths (CJK = 2 columns);
/// words longer than a line are split
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();

    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let sep = usize::from(!current_line.is_empty());

            if current_width + sep + word_width <= max_width {
                if sep == 1 {
                    current_line.push(' ');
                }
                current_line.push_str(word);
                current_width += sep + word_width;
                continue;
            }

            if !current_line.is_empty() {
                result.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(1);
                if current_width + ch_width > max_width && !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }
                current_line.push(ch);
                current_width += ch_width;
            }
        }

        result.push(current_line);
    }

    result
}

/// Truncate a string to a display width with ellipsis
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(1);
        if width + ch_width + 1 > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), ["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\n\nb", 10), ["a", "", "b"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("About", 10), "About");
        assert_eq!(truncate_str("Contact me", 5), "Cont…");
        assert_eq!(truncate_str("x", 0), "");
    }
}
