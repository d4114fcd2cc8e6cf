use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, watch};
use tracing::info;

use folio_core::dom::{History, PageLayout, Viewport, VirtualDocument};
use folio_core::runtime::{PageCommand, PageDriver};
use folio_core::scenario::Scenario;
use folio_core::{AppConfig, NavigationEvent, Page};

pub async fn run(config: &AppConfig, page: &Path, scenario: &Path, realtime: bool, frame_ms: u64) -> Result<()> {
    let layout = PageLayout::load(page)?;
    let scenario = Scenario::load(scenario)?;

    println!(
        "Scenario '{}' on '{}': {} steps, {:.1}s of waits ({})",
        scenario.name,
        layout.title,
        scenario.steps.len(),
        scenario.duration().as_secs_f64(),
        if realtime { "real time" } else { "virtual clock" }
    );

    let (event_tx, mut events) = mpsc::unbounded_channel();
    let page = if realtime {
        let page = Page::with_event_sender(layout.build()?, config, event_tx);
        replay_realtime(page, &scenario, config).await?
    } else {
        let doc = layout.build()?.with_manual_clock(Instant::now());
        let mut page = Page::with_event_sender(doc, config, event_tx);
        scenario.replay(&mut page, Duration::from_millis(frame_ms));
        page
    };

    println!("\nSection changes:");
    let mut changes = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            NavigationEvent::SectionChanged { section_id, section } => {
                changes += 1;
                println!(
                    "  {:>3}. {:<16} top {:>6.0}  bottom {:>6.0}",
                    changes, section_id, section.top, section.bottom
                );
            }
        }
    }
    if changes == 0 {
        println!("  (none)");
    }

    print_final_state(&page);
    Ok(())
}

/// Run the steps against a page owned by the async frame driver
async fn replay_realtime(
    page: Page<VirtualDocument>,
    scenario: &Scenario,
    config: &AppConfig,
) -> Result<Page<VirtualDocument>> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = tokio::spawn(PageDriver::new(page, &config.scroll).run(command_rx, shutdown_rx));

    for (index, step) in scenario.steps.iter().enumerate() {
        match step.wait_duration() {
            Some(wait) => tokio::time::sleep(wait).await,
            None => {
                let step = step.clone();
                command_tx
                    .send(PageCommand::run(move |page: &mut Page<VirtualDocument>| step.apply(page)))
                    .map_err(|_| anyhow!("page driver stopped before step {index}"))?;
            }
        }
    }

    // The driver may already be gone; its page is still returned
    let _ = shutdown_tx.send(true);
    let page = driver.await?;
    info!("Realtime replay finished");
    Ok(page)
}

fn print_final_state(page: &Page<VirtualDocument>) {
    let host = page.host();
    println!("\nFinal state:");
    println!("  section   {}", page.current_section().unwrap_or("-"));
    println!("  url       {}", host.location());
    println!("  scroll_y  {:.0} / {:.0}", host.scroll_y(), host.max_scroll());
    println!("  history   {} entries", host.history_len());
    println!(
        "  menu      {}",
        if page.navbar().is_menu_open() { "open" } else { "closed" }
    );
    println!(
        "  navbar    {}",
        if page.navbar().is_scrolled() { "scrolled" } else { "top" }
    );
}
