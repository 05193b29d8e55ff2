//! Terminal host for gated sample review.
//!
//! Owns the terminal for the duration of a session: draws the current sample
//! with its page renders, turns key presses into triggers, asks for
//! confirmation before destructive actions and runs the page viewer.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod app;
mod confirm;
mod custom_values;
mod key_hint;
pub mod logging;
mod page_view;
mod pager;
mod preview;
pub mod renderer;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use gatereview_core::config::ReviewConfig;
use gatereview_core::{CorrectionStore, Layout, SampleList, Session, SessionOptions};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub use app::App;
pub use pager::PagerState;
pub use renderer::{DocumentRenderer, RenderError, RenderedPage, renderer_for_extension};

/// Everything a review session is started from.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub input: PathBuf,
    pub layout: Layout,
    pub config: ReviewConfig,
    /// Overrides `<input>/<output_dir_name>/<store_file_name>`.
    pub store: Option<PathBuf>,
}

impl ReviewOptions {
    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| self.config.store_path(&self.input))
    }
}

/// Build the session and screen without touching the terminal.
pub fn build_app(options: &ReviewOptions) -> anyhow::Result<App> {
    let config = &options.config;
    let samples = SampleList::scan(&options.input, &config.document_extension)
        .with_context(|| format!("Cannot review {}", options.input.display()))?;
    let store_path = options.store_path();
    let store = CorrectionStore::open(&store_path)
        .with_context(|| format!("Cannot open correction store {}", store_path.display()))?;
    // Fail before the screen opens rather than on the first display.
    store.load()?;
    let renderer = renderer_for_extension(&config.document_extension)?;

    let session = Session::new(
        options.layout.taxonomy.clone(),
        options.layout.gate_name.clone(),
        samples,
        store,
        SessionOptions {
            confirm_discard: config.confirm_discard,
            confirm_clear: config.confirm_clear,
            nav_keys_enabled: config.nav_keys_enabled,
        },
    );
    tracing::info!(
        gate = %options.layout.gate_name,
        samples = session.samples().size(),
        store = %store_path.display(),
        "Starting review"
    );
    Ok(App::new(
        session,
        renderer,
        options.layout.pages_to_display(),
        Duration::from_millis(config.preview_poll_ms),
    ))
}

/// Run an interactive review until the user exits or samples run out.
pub fn run(options: ReviewOptions) -> anyhow::Result<()> {
    let mut app = build_app(&options)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
