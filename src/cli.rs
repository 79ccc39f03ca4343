/*!
vlchart Command Line Interface

Validate, render and export Vega-Lite documents, or build a quick chart from a
CSV file.
*/

use anyhow::Context;
use clap::{Parser, Subcommand};
use polars::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vlchart::chart::{Chart, ChartSpec};
use vlchart::config::Settings;
use vlchart::display::DisplayContext;
use vlchart::encoding::Encoding;
use vlchart::schema::{self, Mark};
use vlchart::writer::Format;
use vlchart::VERSION;

#[derive(Parser)]
#[command(name = "vlchart")]
#[command(about = "Declarative statistical visualization with Vega-Lite")]
#[command(version = VERSION)]
pub struct Cli {
    /// Settings file (defaults to ./vlchart.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a Vega-Lite JSON document
    Validate {
        /// Path to the document
        spec: PathBuf,
    },

    /// Render a document with a renderer and print the display data
    Render {
        /// Path to the document
        spec: PathBuf,

        /// Renderer name (overrides the configured one)
        #[arg(long)]
        renderer: Option<String>,
    },

    /// Export a document to json, html, png or svg
    Save {
        /// Path to the document
        spec: PathBuf,

        /// Output file path
        #[arg(long)]
        output: PathBuf,

        /// Output format (inferred from the output extension by default)
        #[arg(long)]
        format: Option<Format>,
    },

    /// Plot columns of a CSV file
    Plot {
        /// CSV file with a header row
        #[arg(long)]
        csv: PathBuf,

        /// Mark type (point, line, bar, ...)
        #[arg(long, default_value = "point")]
        mark: Mark,

        /// Shorthand for the x channel, e.g. `Horsepower:Q`
        #[arg(long)]
        x: String,

        /// Shorthand for the y channel
        #[arg(long)]
        y: String,

        /// Shorthand for the color channel
        #[arg(long)]
        color: Option<String>,

        /// Output file; prints JSON when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List registered renderers
    Renderers,
}

fn read_spec(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn read_csv(path: &Path) -> anyhow::Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to read CSV {}", path.display()))
}

fn display_context(settings: &Settings) -> anyhow::Result<DisplayContext> {
    let mut ctx = DisplayContext::vegalite();
    settings.apply(&mut ctx)?;
    Ok(ctx)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { spec } => {
            let doc = read_spec(&spec)?;
            match schema::validate(&doc) {
                Ok(()) => println!("{}: valid", spec.display()),
                Err(e) => {
                    eprintln!("{}: {}", spec.display(), e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Render { spec, renderer } => {
            let doc = read_spec(&spec)?;
            let mut ctx = display_context(&settings)?;
            if let Some(name) = renderer {
                ctx.registry.enable(&name)?;
            }
            if ctx.validate {
                schema::validate(&doc)?;
            }
            let bundle = ctx.render(&doc)?;
            println!("{}", serde_json::to_string_pretty(&bundle.to_display_data())?);
        }

        Commands::Save { spec, output, format } => {
            let doc = read_spec(&spec)?;
            if settings.validate {
                schema::validate(&doc)?;
            }
            let format = match format {
                Some(format) => format,
                None => Format::from_path(&output)?,
            };
            let bytes = settings.exporter().export_value(&doc, format)?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }

        Commands::Plot { csv, mark, x, y, color, output } => {
            let df = read_csv(&csv)?;
            let mut encoding = Encoding::new().x(x).y(y);
            if let Some(color) = color {
                encoding = encoding.color(color);
            }
            let chart = Chart::new(df).mark(mark).encode(encoding);
            match output {
                Some(path) => {
                    let format = Format::from_path(&path)?;
                    settings.exporter().save(&chart, &path, Some(format))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", chart.to_json()?),
            }
        }

        Commands::Renderers => {
            let ctx = display_context(&settings)?;
            for name in ctx.registry.names() {
                let marker = if ctx.registry.active_name() == Some(name) { "*" } else { " " };
                println!("{} {}", marker, name);
            }
        }
    }

    Ok(())
}
