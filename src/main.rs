//! Dealer Wizard
//!
//! Terminal front-end for the dealership's multi-step application wizards.
//! Progress is saved after every change and a completed application is
//! recorded as a lead through the configured submission sink.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use dealer_wizard::application::{App, NoticeLog, TracingTelemetry, Wizard};
use dealer_wizard::domain::{by_name, detail_lines, parse_notes};
use dealer_wizard::infrastructure::{
    Config, CsvSink, FileStore, HttpSink, SinkConfig, SinkKind, SubmissionSink,
};
use dealer_wizard::presentation::{render_ui, InputHandler};

#[derive(Parser, Debug)]
#[command(name = "dealer-wizard", version, about = "Car dealership application wizards")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "dealer-wizard.toml")]
    config: PathBuf,

    /// Overrides `log.level` from the configuration
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in an application (the default)
    Run {
        /// Which wizard to run: pre-approval or sell-my-car
        #[arg(long, default_value = "pre-approval")]
        form: String,
    },
    /// List the leads recorded in the CSV ledger
    Leads {
        /// Ledger to read instead of `sink.csv_path`
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    match cli.command.unwrap_or(Command::Run { form: "pre-approval".to_string() }) {
        Command::Run { form } => {
            let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
            init_logging(level, &config.log.file)?;
            run(&config, &form)
        }
        Command::Leads { csv } => {
            let path = csv.unwrap_or_else(|| config.sink.csv_path.clone());
            print_leads(&path)
        }
    }
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging(level: &str, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let writer = File::options().create(true).append(true).open(file)?;
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_sink(config: &SinkConfig) -> Result<Box<dyn SubmissionSink>, Box<dyn std::error::Error>> {
    match config.kind {
        SinkKind::Http => {
            let url = config.url.as_deref().unwrap_or_default();
            let api_key = std::env::var(&config.api_key_env)
                .map_err(|_| format!("environment variable {} is not set", config.api_key_env))?;
            let sink = HttpSink::new(url, &config.table, api_key)?;
            tracing::info!(endpoint = sink.endpoint(), "submitting over http");
            Ok(Box::new(sink))
        }
        SinkKind::Csv => {
            tracing::info!(path = %config.csv_path.display(), "recording leads to csv");
            Ok(Box::new(CsvSink::new(config.csv_path.clone())))
        }
    }
}

fn run(config: &Config, form: &str) -> Result<(), Box<dyn std::error::Error>> {
    let definition = by_name(form).ok_or_else(|| format!("unknown form `{form}`"))?;
    let sink = build_sink(&config.sink)?;
    let notices = NoticeLog::new();
    let wizard = Wizard::new(definition, Box::new(FileStore::new(config.store.path.clone())))
        .with_notifier(notices.clone())
        .with_telemetry(TracingTelemetry);
    let mut app = App::new(wizard, sink, notices);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }

    Ok(())
}

/// Redraws and dispatches key presses until the user quits.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn print_leads(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rows = CsvSink::read_rows(path)?;
    if rows.is_empty() {
        println!("No leads recorded in {}", path.display());
        return Ok(());
    }
    for (index, row) in rows.iter().enumerate() {
        println!("#{} {} <{}> {} [{}]", index + 1, row.name, row.email, row.phone, row.status);
        println!("  {}", row.message);
        match parse_notes(&row.notes) {
            Ok(notes) => {
                for (key, value) in detail_lines(&notes) {
                    println!("  {key}: {value}");
                }
            }
            Err(err) => println!("  notes unreadable: {err}"),
        }
        println!();
    }
    Ok(())
}
