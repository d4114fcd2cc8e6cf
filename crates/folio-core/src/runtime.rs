//! Async frame driver
//!
//! Stands in for a browser's per-frame callback: a tokio task owns the
//! `Page`, ticks it at the configured frame rate and applies commands sent
//! from other tasks.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::dom::Host;
use crate::page::{Page, PageEvent};
use crate::config::ScrollConfig;

/// Closure run against the page inside the driver task
pub type PageTask<H> = Box<dyn FnOnce(&mut Page<H>) + Send>;

pub enum PageCommand<H: Host> {
    Dispatch(PageEvent),
    Run(PageTask<H>),
}

impl<H: Host> PageCommand<H> {
    pub fn run(task: impl FnOnce(&mut Page<H>) + Send + 'static) -> Self {
        PageCommand::Run(Box::new(task))
    }
}

pub struct PageDriver<H: Host> {
    page: Page<H>,
    frame: Duration,
}

impl<H: Host + Send + 'static> PageDriver<H> {
    pub fn new(page: Page<H>, config: &ScrollConfig) -> Self {
        Self {
            page,
            frame: config.frame_interval(),
        }
    }

    /// Drive frames until shutdown is signalled or every command sender is
    /// gone, then hand the page back
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<PageCommand<H>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Page<H> {
        info!(frame_ms = self.frame.as_millis() as u64, "Page driver started");

        let mut frames = tokio::time::interval(self.frame);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Page driver received shutdown signal");
                        break;
                    }
                }

                command = commands.recv() => {
                    match command {
                        Some(PageCommand::Dispatch(event)) => {
                            self.page.dispatch(event);
                        }
                        Some(PageCommand::Run(task)) => task(&mut self.page),
                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }

                _ = frames.tick() => {
                    self.page.tick();
                }
            }
        }

        self.page
    }
}
