pub mod app;
pub mod ui;

use std::io;
use std::time::Instant;

use chrono::Local;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::error;

use app::{App, Flow};
use ui::ui;

use crate::client::BackendClient;
use crate::config::Config;
use crate::notify::OverlaySurface;
use crate::scheduler::TICK_INTERVAL;
use crate::session::Session;

pub async fn run_tui(config: &Config) -> anyhow::Result<()> {
    let client = BackendClient::new(&config.backend.url)?;
    let session = Session::new(
        client,
        OverlaySurface::default(),
        &config.alerts,
        config.sync.mirror_snapshots,
    );
    let mut app = App::new(session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.session.shutdown();

    if let Err(err) = res {
        error!(error = %err, "TUI loop failed");
        return Err(err);
    }
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    app.session.start();

    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut events = EventStream::new();

    loop {
        app.session
            .dispatcher_mut()
            .surface_mut()
            .toasts
            .expire(Instant::now());
        app.clamp_selection();
        terminal.draw(|f| ui(f, app))?;

        tokio::select! {
            _ = ticker.tick() => {
                app.session.tick(Local::now().naive_local());
            }
            Some(outcome) = app.session.next_outcome() => app.session.apply(outcome),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) == Flow::Quit {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}
