use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use tracing_subscriber::EnvFilter;

use fzpeek::{BackendKind, FinderOverlay, OverlayConfig, OverlayOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "fzpeek",
    version,
    about = "Fuzzy file finder overlay with a syntax-highlighted preview pane"
)]
struct Cli {
    /// Directory to search; defaults to the current directory.
    #[arg(value_name = "DIR")]
    root: Option<PathBuf>,

    /// Search backend to drive.
    #[arg(long, value_enum, default_value_t = BackendArg::Command)]
    backend: BackendArg,

    /// Result rows in the list pane.
    #[arg(long)]
    rows: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    /// External `fd` piped into `fzf --filter`.
    Command,
    /// In-process directory walk.
    Walk,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Command => BackendKind::Command,
            BackendArg::Walk => BackendKind::Walk,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let mut config = OverlayConfig {
        backend: cli.backend.into(),
        ..OverlayConfig::default()
    };
    if let Some(rows) = cli.rows {
        config.list_rows = rows.max(1);
    }

    let mut overlay = FinderOverlay::open(root, config);
    if let Some(path) = run(&mut overlay)? {
        println!("{path}");
    }
    Ok(())
}

/// Write structured logs to the file named by `FZPEEK_LOG`, if set. The
/// alternate screen owns stdout/stderr while the overlay runs.
fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("FZPEEK_LOG") else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Pump the terminal event loop until the user confirms or cancels.
fn run(overlay: &mut FinderOverlay) -> Result<Option<String>> {
    let mut terminal = ratatui::init();
    terminal.clear()?;

    let outcome: Result<OverlayOutcome> = loop {
        overlay.tick();

        if let Err(err) = terminal.draw(|frame| {
            let area = frame.area();
            let rows = overlay.render(area.width);
            let height = (rows.len() as u16).min(area.height);
            let target = Rect::new(area.x, area.y, area.width, height);
            frame.render_widget(Paragraph::new(Text::from(rows)), target);
        }) {
            break Err(err.into());
        }

        match event::poll(Duration::from_millis(16)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(outcome) = overlay.handle_key(key) {
                        break Ok(outcome);
                    }
                }
                Ok(_) => {}
                Err(err) => break Err(err.into()),
            },
            Ok(false) => {}
            Err(err) => break Err(err.into()),
        }
    };

    ratatui::restore();

    Ok(match outcome? {
        OverlayOutcome::Confirmed(path) => Some(path),
        OverlayOutcome::Cancelled => None,
    })
}
