use gatepass::api::GateApiClient;
use gatepass::app::{App, Mode};
use gatepass::prefs::PrefStore;
use gatepass::ui;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    // Setup panic hook to ensure terminal cleanup on panic
    setup_panic_hook();

    let runtime = tokio::runtime::Runtime::new()?;

    let prefs = PrefStore::open().ok_or_else(|| eyre!("could not determine home directory"))?;
    let client = GateApiClient::from_env();
    let mut app = App::new(prefs, client);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = runtime.block_on(run_app(&mut terminal, &mut app));

    restore_terminal(&mut terminal)?;
    result
}

/// Send tracing output to `~/.gatepass/gatepass.log`; stdout belongs to the
/// TUI. Logging failures are not fatal.
fn init_logging() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let dir = home.join(".gatepass");
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("gatepass.log")) else {
        return;
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gatepass=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

/// Setup panic hook to restore terminal on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Restore terminal to normal mode
fn restore_terminal<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    // Startup requests from persisted state
    app.initialize();

    // Create async event stream for keyboard input
    let mut event_stream = EventStream::new();

    // Take the message receiver from the app (we need ownership for select!)
    let mut message_rx = app.message_rx.take();

    loop {
        // Draw the UI only when needed
        if app.needs_redraw {
            terminal.draw(|f| ui::render(f, app))?;
            app.needs_redraw = false;
        }

        // Poll keyboard events, request results, and a 16ms animation tick
        let timeout = tokio::time::sleep(std::time::Duration::from_millis(16));

        tokio::select! {
            _ = timeout => {
                app.tick();
            }

            event_result = event_stream.next() => {
                match event_result {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        handle_key(app, key);
                    }
                    Some(Ok(Event::Resize(_, _))) => {
                        app.mark_dirty();
                    }
                    _ => {}
                }
            }

            msg = async {
                match &mut message_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                if let Some(msg) = msg {
                    app.handle_message(msg);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits, regardless of mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        Mode::EditingIdentifier => match key.code {
            KeyCode::Esc => app.cancel_identifier_edit(),
            KeyCode::Enter => app.submit_identifier(),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                app.input_char(c)
            }
            _ => {}
        },
        Mode::Normal => match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Char('i') => app.begin_identifier_edit(),
            KeyCode::Char('r') => app.refresh_action(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom(0.1),
            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom(-0.1),
            _ => {}
        },
    }
}
