//! `taskboard` — terminal task board synced with a remote task API.
//!
//! Shows the cached snapshot immediately, then replaces it with the server's
//! collection once it arrives. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Against a local taskboard-server
//! cargo run --bin taskboard -- --api-url http://127.0.0.1:3000
//!
//! # Offline, editing the cached snapshot in memory
//! cargo run --bin taskboard -- --offline
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::api::TaskApi;
use taskboard::api::http::HttpTaskApi;
use taskboard::api::memory::InMemoryTaskApi;
use taskboard::app::App;
use taskboard::cache::file::FileCache;
use taskboard::cache::load_snapshot;
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::sync::{self, SyncCommand};
use taskboard::tasks::TaskStore;
use taskboard::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    // Only a broken default file falls back; an explicit --config must load.
    let config = match ClientConfig::load_or_fallback(&cli, |e| {
        eprintln!("Warning: ignoring config file: {e}");
    }) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Logs go to a file, never stdout, since ratatui owns the terminal.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(api_url = %config.api_url, offline = config.offline, "taskboard starting");

    let cache_dir = config
        .cache_dir
        .clone()
        .or_else(FileCache::default_dir)
        .unwrap_or_else(|| std::env::temp_dir().join("taskboard"));
    let cache = FileCache::new(cache_dir);

    if config.offline {
        let seed = match load_snapshot(&cache) {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable task cache");
                Vec::new()
            }
        };
        run(InMemoryTaskApi::with_tasks(seed), cache, &config).await
    } else {
        let api = HttpTaskApi::new(&config.api_url, config.request_timeout)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        run(api, cache, &config).await
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Set up the terminal, run the app against `api`, and restore the terminal.
async fn run<A: TaskApi + 'static>(api: A, cache: FileCache, config: &ClientConfig) -> io::Result<()> {
    let backend_kind = api.backend_kind();
    let store = TaskStore::new(cache, config.store_config());
    let app = App::new(store, backend_kind).with_timestamp_format(config.timestamp_format.clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app, Arc::new(api), config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskboard exiting");
    result
}

/// Main application loop.
async fn run_app<A: TaskApi + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App<FileCache>,
    api: Arc<A>,
    config: &ClientConfig,
) -> io::Result<()> {
    let (cmd_tx, mut evt_rx) = sync::spawn_sync(api, config.channel_capacity);

    // Cached placeholder first, then the authoritative fetch.
    app.store.load_cached();
    let initial = app.refresh();
    app.send(&cmd_tx, initial);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain finished requests (non-blocking).
        while let Ok(outcome) = evt_rx.try_recv() {
            app.apply_outcome(outcome);
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(request) = app.handle_key_event(key) {
                app.send(&cmd_tx, request);
            }
        }

        if app.should_quit {
            if cmd_tx.try_send(SyncCommand::Shutdown).is_err() {
                tracing::debug!("sync worker already gone");
            }
            return Ok(());
        }
    }
}
