// Pico: template parser with an interactive AST viewer

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser as _, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pico::parser::ast::Document;
use pico::ui::outline::Outline;
use pico::ui::App;
use pico::{parse_with_options, ParseError, ParseOptions};

#[derive(clap::Parser)]
#[command(name = "pico", version, about = "Parse and inspect Pico templates")]
struct Cli {
    /// Maximum nesting of blocks, elements and expressions
    #[arg(long, global = true, env = "PICO_MAX_DEPTH", default_value_t = pico::parser::parse::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a template and report success or the first error
    Check {
        /// Path to the .pico file
        file: PathBuf,
    },
    /// Print the syntax tree of a template
    Dump {
        /// Path to the .pico file
        file: PathBuf,
        /// Emit JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },
    /// Browse the syntax tree in a terminal UI
    View {
        /// Path to the .pico file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so `dump` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = ParseOptions::default().with_max_depth(cli.max_depth);

    match cli.command {
        Commands::Check { file } => check_cmd(&file, options),
        Commands::Dump { file, json } => dump_cmd(&file, options, json),
        Commands::View { file } => view_cmd(&file, options),
    }
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn report(file: &Path, err: &ParseError) {
    let location = err.location();
    eprintln!(
        "{}:{}:{}: {}",
        file.display(),
        location.line,
        location.column,
        err
    );
}

fn parse_or_exit(file: &Path, source: &str, options: ParseOptions) -> Document {
    match parse_with_options(source, options) {
        Ok(document) => document,
        Err(err) => {
            report(file, &err);
            std::process::exit(1);
        }
    }
}

fn check_cmd(file: &Path, options: ParseOptions) -> Result<()> {
    let source = read_source(file)?;
    let document = parse_or_exit(file, &source, options);
    let rows = Outline::new(&document).rows().len();
    println!(
        "ok: {} top-level nodes, {} total",
        document.nodes.len(),
        rows
    );
    Ok(())
}

fn dump_cmd(file: &Path, options: ParseOptions, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let document = parse_or_exit(file, &source, options);

    if json {
        let output = serde_json::to_string_pretty(&document).context("failed to serialize AST")?;
        println!("{}", output);
    } else {
        for row in Outline::new(&document).rows() {
            println!(
                "{}{}  @{}..{}",
                "  ".repeat(row.depth),
                row.label,
                row.span.start,
                row.span.end
            );
        }
    }
    Ok(())
}

fn view_cmd(file: &Path, options: ParseOptions) -> Result<()> {
    let source = read_source(file)?;
    let result = parse_with_options(&source, options);
    if let Err(err) = &result {
        tracing::warn!(error = %err, "template failed to parse; opening viewer on the error");
    }

    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("template")
        .to_string();

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(source, file_name, result);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("viewer failed")
}
