//! Glowform command line.
//!
//! Works on forms saved in a directory store, the same key-value layout the
//! builder uses, and can migrate a server database.
//!
//! # Usage
//!
//! ```bash
//! glowform import survey.json
//! glowform preview 2f1c...
//! glowform export-csv 2f1c... --extended
//! glowform url 2f1c... --base https://forms.example.org
//! glowform migrate --database glowform.sqlite3
//! ```

use std::{
    error::Error,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use glowform_core::db::{close_db, open_db, schema_version};
use glowform_core::persistence::DEFAULT_SHARE_BASE;
use glowform_core::{
    default_log_level, export_csv, init_console_logging, render, CsvLayout, DirStore, FormConfig,
    FormId, FormStore,
};
use log::info;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "glowform")]
#[command(version)]
#[command(about = "Glowform feedback form tools", long_about = None)]
struct Cli {
    /// Directory holding saved forms
    #[arg(long, env = "GLOWFORM_STORE_DIR", default_value = ".glowform")]
    store_dir: PathBuf,

    /// Log level written to stderr
    #[arg(long, env = "GLOWFORM_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a form definition from a JSON file
    Import { file: PathBuf },
    /// Print the form as it would be displayed
    Preview {
        form_id: FormId,
        /// Print the preview tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the form questions as CSV
    ExportCsv {
        form_id: FormId,
        /// Include ids and conditional logic
        #[arg(long)]
        extended: bool,
    },
    /// Print the share link for a form
    Url {
        form_id: FormId,
        #[arg(long, env = "GLOWFORM_SHARE_BASE", default_value = DEFAULT_SHARE_BASE)]
        base: String,
    },
    /// Print the stored form as JSON
    Show { form_id: FormId },
    /// Create or upgrade a server database
    Migrate {
        #[arg(long, env = "GLOWFORM_DATABASE_PATH", default_value = "glowform.sqlite3")]
        database: PathBuf,
    },
    /// Check core linkage
    Ping,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_console_logging(&level) {
        eprintln!("glowform: {err}");
        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("glowform: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> CliResult<()> {
    match cli.command {
        Commands::Import { file } => {
            let id = import_form(&cli.store_dir, &file)?;
            writeln!(out, "{id}")?;
        }
        Commands::Preview { form_id, json } => {
            let config = load_form(&cli.store_dir, form_id)?;
            let preview = render(&config);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&preview)?)?;
            } else {
                write!(out, "{}", preview.to_text())?;
            }
        }
        Commands::ExportCsv { form_id, extended } => {
            let config = load_form(&cli.store_dir, form_id)?;
            let layout = if extended {
                CsvLayout::Extended
            } else {
                CsvLayout::Basic
            };
            writeln!(out, "{}", export_csv(&config, layout))?;
        }
        Commands::Url { form_id, base } => {
            let store = FormStore::with_share_base(DirStore::open(&cli.store_dir)?, base);
            writeln!(out, "{}", store.url(form_id))?;
        }
        Commands::Show { form_id } => {
            let config = load_form(&cli.store_dir, form_id)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
        }
        Commands::Migrate { database } => {
            let conn = open_db(&database)?;
            let version = schema_version(&conn)?;
            close_db(conn)?;
            writeln!(out, "{} schema_version={version}", database.display())?;
        }
        Commands::Ping => {
            writeln!(out, "glowform_core ping={}", glowform_core::ping())?;
            writeln!(out, "glowform_core version={}", glowform_core::core_version())?;
        }
    }
    Ok(())
}

/// Validates and saves a form file. Returns the stored form id.
fn import_form(store_dir: &Path, file: &Path) -> CliResult<FormId> {
    let raw = std::fs::read_to_string(file)?;
    let config: FormConfig = serde_json::from_str(&raw)?;

    let mut store = FormStore::new(DirStore::open(store_dir)?);
    store.save(&config)?;
    info!(
        "event=form_import module=cli status=ok form_id={} field_count={}",
        config.id,
        config.fields.len()
    );
    Ok(config.id)
}

fn load_form(store_dir: &Path, form_id: FormId) -> CliResult<FormConfig> {
    let store = FormStore::new(DirStore::open(store_dir)?);
    store
        .load(form_id)
        .ok_or_else(|| format!("no saved form with id {form_id}").into())
}
