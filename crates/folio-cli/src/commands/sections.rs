use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use folio_core::dom::{Document, PageLayout, Viewport};
use folio_core::{AppConfig, Page, PageEvent};

pub fn run(config: &AppConfig, page: &Path, at: Option<f64>) -> Result<()> {
    let layout = PageLayout::load(page)?;
    let doc = layout.build()?.with_manual_clock(Instant::now());
    let mut page = Page::new(doc, config);

    if let Some(y) = at {
        page.host_mut().scroll_to(y);
        page.dispatch(PageEvent::Scroll);
        // let the scroll debounce fire
        let wait = Duration::from_millis(config.navigation.scroll_debounce_ms + 1);
        page.host_mut().advance(wait);
        page.tick();
    }

    let host = page.host();
    println!(
        "{} ({} x {} px, scroll_y {:.0} of {:.0})\n",
        layout.title,
        host.inner_width(),
        host.inner_height(),
        host.scroll_y(),
        host.max_scroll()
    );

    let sections: Vec<_> = page.navigation().sections().collect();
    if sections.is_empty() {
        println!("No sections matching '{}'.", config.navigation.section_selector);
        return Ok(());
    }

    println!("Sections ({}):", sections.len());
    for section in &sections {
        let marker = if page.current_section() == Some(section.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let visible = if section.is_visible { "visible" } else { "" };
        println!(
            "  {} {:<16} {:>7.0} {:>7.0} {:>7.0}  {}",
            marker,
            section.id,
            section.top,
            section.bottom,
            section.height(),
            visible
        );
    }

    println!("\nLinks:");
    let links = page.navigation().links();
    if links.is_empty() {
        println!("  (none)");
    }
    for link in links {
        let href = host.attribute(link.element, "href").unwrap_or_default();
        let state = if page.section(&link.section_id).is_some() {
            ""
        } else {
            "  (no such section)"
        };
        println!("  {:<16} -> {}{}", href, link.section_id, state);
    }

    Ok(())
}
