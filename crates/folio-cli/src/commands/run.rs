use std::io;
use std::path::Path;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use folio_core::dom::PageLayout;
use folio_core::storage::JsonFileStorage;
use folio_core::AppConfig;
use folio_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    widgets::{MenuWidget, NavbarWidget, PageViewWidget, StatusBarWidget},
    App,
};

type PreviewTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub fn run(config: AppConfig, page: &Path) -> Result<()> {
    let layout = PageLayout::load(page)?;
    let doc = layout.build()?;
    let storage = JsonFileStorage::open(config.preferences_path());
    info!(page = %page.display(), sections = layout.sections.len(), "Starting preview");

    let event_handler = EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.scroll.animation_fps);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetTitle(format!("folio - {}", layout.title))
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(doc, config, storage);
    let result = main_loop(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Some(section) = app.page.current_section() {
        info!(section, "Preview closed");
    }
    result
}

fn main_loop(terminal: &mut PreviewTerminal, app: &mut App<JsonFileStorage>, event_handler: &EventHandler) -> Result<()> {
    // Checked at the end of each iteration to pick the next poll interval
    let mut needs_fast_update = false;

    loop {
        let size = terminal.size()?;
        let page_area = app.page_area();
        if size.width != page_area.width || size.height != page_area.height + 1 {
            app.resize(size.width, size.height);
        }

        app.tick();

        let view = &*app;
        terminal.draw(|frame| {
            let navbar_area = view.navbar_area();
            PageViewWidget::render(frame, view.page_area(), view);
            NavbarWidget::render(frame, navbar_area, view);
            MenuWidget::render(frame, navbar_area, view);
            StatusBarWidget::render(frame, view.status_area(), view);
        })?;

        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app.keymap);
                    app.handle_action(action);
                }
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
                AppEvent::Resize(width, height) => app.resize(width, height),
                AppEvent::Tick => {}
            }
        }

        needs_fast_update = app.needs_fast_update();

        if app.should_quit {
            return Ok(());
        }
    }
}
