//! Timetabler command line.
//!
//! Submits faculty loads for generation, manages saved timetables and
//! exports any view of a result.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use timetabler::export::{export_to_dir, ExportFormat};
use timetabler::generation::{GenerationClient, GenerationSession, ResourceSetup, TimetableError};
use timetabler::grid::{GenerationResult, ResourceKind, Selection};
use timetabler::load::FacultyInput;
use timetabler::{ClientConfig, StoreClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "timetabler", version, about = "Generate and export academic timetables")]
struct Cli {
    /// JSON client config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Overrides the user id
    #[arg(long, global = true)]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a timetable from a setup and faculty load file
    Generate {
        /// JSON file with `setup` and `faculty`
        input: PathBuf,
        /// Write the full result as JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Export every view into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        #[arg(long, default_value = "xlsx")]
        format: ExportFormat,
        /// Save the result to the store
        #[arg(long)]
        save: bool,
    },
    /// List saved timetables, newest first
    List,
    /// Delete a saved timetable
    Delete { id: String },
    /// Export a view of a saved or generated result file
    Export {
        /// Result JSON, as written by `generate --output` or listed by the store
        result: PathBuf,
        #[arg(long, default_value = "class")]
        view: ResourceKind,
        /// Only this resource; all resources when omitted
        #[arg(long)]
        resource: Option<String>,
        #[arg(long, default_value = "xlsx")]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Deserialize)]
struct GenerateInput {
    setup: ResourceSetup,
    faculty: Vec<FacultyInput>,
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(base_url) = &cli.base_url {
        config.set_base_url(base_url)?;
    }
    if let Some(user_id) = &cli.user_id {
        config = config.with_user_id(user_id.clone());
    }
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn report_failure(err: &TimetableError) {
    eprintln!("{}", err);
    if err.is_service_reported() || matches!(err, TimetableError::Network { .. }) {
        eprintln!("\nPossible fixes:");
        for hint in err.remediation_hints() {
            eprintln!("  - {}", hint);
        }
    }
}

fn export_all_views(result: &GenerationResult, dir: &Path, format: ExportFormat) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    for kind in ResourceKind::ALL {
        let view = result.view(kind);
        match export_to_dir(&view, &Selection::All, format, dir) {
            Ok(path) => println!("Exported {}", path.display()),
            Err(timetabler::export::ExportError::NoData) => {
                println!("No data available for {} view", kind)
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "timetabler=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(base_url = %config.base_url, user = %config.user_id, "Loaded configuration");

    match cli.command {
        Command::Generate {
            input,
            output,
            export_dir,
            format,
            save,
        } => {
            let input: GenerateInput = read_json(&input)?;
            let session = GenerationSession::new(GenerationClient::new(config.clone())?);

            let result = match session.generate(input.setup, input.faculty).await {
                Ok(result) => result,
                Err(err) => {
                    report_failure(&err);
                    bail!("timetable generation failed");
                }
            };
            println!(
                "Generated '{}': {} classes, {} faculty",
                result.title,
                result.class_timetable.len(),
                result.teacher_timetable.len()
            );

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&*result)?)?;
                println!("Wrote {}", path.display());
            }
            if let Some(dir) = export_dir {
                export_all_views(&result, &dir, format)?;
            }
            if save {
                let saved = StoreClient::new(config)?.save(&result, None).await?;
                println!("Saved as {}", saved.id);
            }
        }
        Command::List => {
            let timetables = StoreClient::new(config)?.list(true).await?;
            if timetables.is_empty() {
                println!("No saved timetables");
            }
            for saved in timetables.iter() {
                let created = saved
                    .created_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {}  {}", saved.id, created, saved.result.title);
            }
        }
        Command::Delete { id } => {
            if StoreClient::new(config)?.delete(&id).await? {
                println!("Deleted {}", id);
            } else {
                bail!("timetable {} not found", id);
            }
        }
        Command::Export {
            result,
            view,
            resource,
            format,
            out_dir,
        } => {
            let result: GenerationResult = read_json(&result)?;
            let selection = resource.map(Selection::One).unwrap_or_default();
            std::fs::create_dir_all(&out_dir)?;
            let path = export_to_dir(&result.view(view), &selection, format, &out_dir)?;
            println!("Exported {}", path.display());
        }
    }

    Ok(())
}
