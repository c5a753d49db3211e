use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;
use vitalwatch::app::{App, View};
use vitalwatch::config::{build_source, LogSettings, Settings, SourceSettings, DEFAULT_CONFIG_FILE};
use vitalwatch::data::duration::{parse_duration, parse_nonzero_duration};
use vitalwatch::{events, export, ui, AlertStore, CsvAlertLog, Pipeline, Scheduler, VitalsFrame};
use vitalwatch_adapters::VitalsSource;

#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(about = "Terminal dashboard for monitoring patient vital signs")]
struct Args {
    /// Settings file (TOML); missing file means defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Read readings from a spreadsheet export (CSV)
    #[arg(long, conflicts_with_all = ["document", "http"])]
    csv: Option<PathBuf>,

    /// Read readings from a JSON-lines document collection
    #[arg(long, conflicts_with_all = ["csv", "http"])]
    document: Option<PathBuf>,

    /// Read readings from a REST API base URL
    #[arg(long, conflicts_with_all = ["csv", "document"])]
    http: Option<String>,

    /// Refresh interval (e.g. "10s", "500ms")
    #[arg(short, long, value_parser = parse_nonzero_duration)]
    refresh: Option<Duration>,

    /// Report the device offline when the newest reading is older than this
    #[arg(long, value_parser = parse_nonzero_duration)]
    offline_after: Option<Duration>,

    /// Alert log file
    #[arg(long)]
    alerts: Option<PathBuf>,

    /// Do not repeat an alert of the same kind within this window (e.g. "1m")
    #[arg(long, value_parser = parse_duration)]
    suppress: Option<Duration>,

    /// Number of recent readings shown in trends
    #[arg(short, long)]
    window: Option<usize>,

    /// Fetch once, write the readings to this CSV file and exit
    #[arg(short, long, conflicts_with = "headless")]
    export: Option<PathBuf>,

    /// Run the refresh loop without the terminal UI, one JSON line per tick
    #[arg(long)]
    headless: bool,

    /// Log file used while the terminal UI is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// CLI flags take precedence over the settings file and environment.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref path) = self.csv {
            settings.source = SourceSettings::Csv { path: path.clone() };
        }
        if let Some(ref path) = self.document {
            settings.source = SourceSettings::Document { path: path.clone() };
        }
        if let Some(ref endpoint) = self.http {
            let timeout = settings.fetch_timeout;
            settings.source = SourceSettings::Http {
                endpoint: endpoint.clone(),
                timeout,
            };
        }
        if let Some(refresh) = self.refresh {
            settings.refresh = refresh;
        }
        if let Some(offline_after) = self.offline_after {
            settings.offline_after = offline_after;
        }
        if let Some(ref path) = self.alerts {
            settings.alerts.path = path.clone();
        }
        if self.suppress.is_some() {
            settings.alerts.suppress_for = self.suppress;
        }
        if let Some(window) = self.window {
            settings.window = window;
        }
        if let Some(ref path) = self.log_file {
            settings.log.file = path.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(&args.config)?;
    args.apply(&mut settings);
    settings.validate()?;

    let interactive = args.export.is_none() && !args.headless;
    init_logging(&settings.log, interactive)?;

    let source = build_source(&settings.source)?;
    let log = CsvAlertLog::new(&settings.alerts.path);
    let log_path = log.path().display().to_string();
    let store = Arc::new(
        AlertStore::open(Box::new(log), settings.alerts.suppress_for)
            .with_context(|| format!("Failed to open alert log {}", log_path))?,
    );
    let pipeline = Pipeline::new(source.clone(), store.clone(), settings.pipeline());

    tracing::info!(source = source.description(), "vitalwatch starting");

    let rt = Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_once(&pipeline, export_path));
    }

    if args.headless {
        return rt.block_on(run_headless(pipeline, settings.refresh));
    }

    run_tui(&rt, pipeline, source, store, &settings)
}

/// Route tracing output to the log file while the terminal is in use
fn init_logging(settings: &LogSettings, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    if to_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.file)
            .with_context(|| format!("Failed to open log file {}", settings.file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Fetch once and write the readings to a CSV file
async fn export_once(pipeline: &Pipeline, export_path: &Path) -> Result<()> {
    let readings = pipeline.fetch().await?;
    export::export_to_file(export_path, &readings)?;

    println!(
        "Exported {} readings to: {}",
        readings.len(),
        export_path.display()
    );
    Ok(())
}

/// Run the refresh loop until Ctrl-C, printing a summary of every frame
async fn run_headless(pipeline: Pipeline, refresh: Duration) -> Result<()> {
    let scheduler = Scheduler::spawn(pipeline, refresh);
    let mut frames = scheduler.subscribe();

    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    println!("{}", frame_summary(&frame));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    scheduler.stop().await;
    Ok(())
}

fn frame_summary(frame: &VitalsFrame) -> serde_json::Value {
    serde_json::json!({
        "tick": frame.tick,
        "updated_at": frame.updated_at,
        "readings": frame.readings.len(),
        "connectivity": frame.connectivity,
        "latest": frame.latest(),
        "fired": frame.fired.iter().map(|kind| kind.message()).collect::<Vec<_>>(),
        "notices": frame.notices.iter().map(|n| n.message.as_str()).collect::<Vec<_>>(),
    })
}

/// Run the TUI over a background refresh loop
fn run_tui(
    rt: &Runtime,
    pipeline: Pipeline,
    source: Arc<dyn VitalsSource>,
    store: Arc<AlertStore>,
    settings: &Settings,
) -> Result<()> {
    let mut app = {
        let _guard = rt.enter();
        let scheduler = Scheduler::spawn(pipeline, settings.refresh);
        App::new(scheduler, source, store, settings)?
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    rt.block_on(app.into_scheduler().stop());
    tracing::info!("vitalwatch stopped");

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        app.poll_frame();

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Vitals => ui::vitals::render(frame, app, chunks[2]),
                View::Alerts => ui::alerts::render(frame, app, chunks[2]),
                View::BloodPressure => ui::pressure::render(frame, app, chunks[2]),
                View::Export => ui::export::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
