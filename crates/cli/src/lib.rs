use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use doc_model::{GhostHighlight, Highlight, HighlightId, Position};
use pdf_highlighter_core::{partition, HighlighterConfig};
use serde::Serialize;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use viewer_core::{
    scaled_position_to_viewport, DeltaMode, PageViewport, ScaleValue, WheelInput, ZoomController,
};

#[derive(Debug, Parser)]
#[command(name = "pdf-highlighter")]
#[command(about = "Inspect highlight collections and zoom behaviour")]
pub struct Cli {
    /// JSON configuration file; defaults plus PDF_HIGHLIGHTER_* overrides otherwise.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log to stderr; repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Group highlight fragments by page.
    Partition {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// In-progress highlight to place first on its pages.
        #[arg(long, value_name = "FILE")]
        ghost: Option<PathBuf>,
    },
    /// Project highlights into viewport pixels for a page size and scale.
    Project {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 612.0)]
        page_width: f64,
        #[arg(long, default_value_t = 792.0)]
        page_height: f64,
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        #[arg(long, default_value_t = 0)]
        rotation: i32,
        /// Only project highlights on this page.
        #[arg(long)]
        page: Option<u32>,
    },
    /// Apply a zoom gesture to a scale and print the result.
    Zoom {
        #[arg(long, default_value = "page-width")]
        scale: ScaleValue,
        /// Ctrl-wheel delta.
        #[arg(long, allow_hyphen_values = true, conflicts_with = "step")]
        wheel: Option<f64>,
        #[arg(long, value_enum, default_value_t = WheelMode::Pixel)]
        delta_mode: WheelMode,
        /// Signed button step.
        #[arg(long, allow_hyphen_values = true)]
        step: Option<f64>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WheelMode {
    Pixel,
    Line,
    Page,
}

impl From<WheelMode> for DeltaMode {
    fn from(mode: WheelMode) -> Self {
        match mode {
            WheelMode::Pixel => DeltaMode::Pixel,
            WheelMode::Line => DeltaMode::Line,
            WheelMode::Page => DeltaMode::Page,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartitionEntry {
    id: Option<HighlightId>,
    ghost: bool,
    rects: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectedHighlight {
    id: HighlightId,
    #[serde(flatten)]
    position: Position,
}

#[derive(Debug, Serialize)]
struct ZoomOutput {
    scale: String,
    label: String,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Partition { file, ghost } => run_partition(&file, ghost.as_deref()),
        Commands::Project {
            file,
            page_width,
            page_height,
            scale,
            rotation,
            page,
        } => {
            let viewport = PageViewport::new([0.0, 0.0, page_width, page_height], scale, rotation);
            run_project(&file, &viewport, page)
        }
        Commands::Zoom {
            scale,
            wheel,
            delta_mode,
            step,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_zoom(&config, scale, wheel, delta_mode.into(), step)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => return Ok(()),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    WriteLogger::init(level, Config::default(), std::io::stderr())
        .context("failed to initialize logging")
}

fn load_config(path: Option<&Path>) -> Result<HighlighterConfig> {
    match path {
        Some(path) => HighlighterConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => HighlighterConfig::from_env()
            .context("invalid PDF_HIGHLIGHTER_* environment override"),
    }
}

fn read_highlights(file: &Path) -> Result<Vec<Highlight>> {
    ensure_file_exists(file)?;

    let json = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let highlights = doc_model::highlights_from_json(&json).context("invalid highlights JSON")?;
    log::info!("loaded {} highlights from {}", highlights.len(), file.display());
    Ok(highlights)
}

fn run_partition(file: &Path, ghost: Option<&Path>) -> Result<()> {
    let highlights = read_highlights(file)?;
    let ghost = ghost
        .map(|path| -> Result<GhostHighlight> {
            ensure_file_exists(path)?;
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&json).context("invalid ghost highlight JSON")
        })
        .transpose()?;

    let groups = partition(&highlights, ghost.as_ref());
    let payload: BTreeMap<u32, Vec<PartitionEntry>> = groups
        .into_iter()
        .map(|(page, group)| {
            let entries = group
                .into_iter()
                .map(|highlight| PartitionEntry {
                    ghost: highlight.is_ghost(),
                    rects: highlight.position.rects.len(),
                    id: highlight.id,
                })
                .collect();
            (page, entries)
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_project(file: &Path, viewport: &PageViewport, page: Option<u32>) -> Result<()> {
    if page == Some(0) {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let projected: Vec<ProjectedHighlight> = read_highlights(file)?
        .into_iter()
        .filter(|highlight| page.map_or(true, |page| highlight.position.page_number == page))
        .map(|highlight| ProjectedHighlight {
            position: scaled_position_to_viewport(&highlight.position, viewport),
            id: highlight.id,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&projected)?);
    Ok(())
}

fn run_zoom(
    config: &HighlighterConfig,
    scale: ScaleValue,
    wheel: Option<f64>,
    delta_mode: DeltaMode,
    step: Option<f64>,
) -> Result<()> {
    let mut zoom = ZoomController::new(config.zoom.clone());
    zoom.set(scale);

    if let Some(delta_y) = wheel {
        zoom.wheel(&WheelInput {
            delta_y,
            delta_mode,
            ctrl_key: true,
            meta_key: false,
        });
    } else if let Some(step) = step {
        zoom.step(step);
    }

    let payload = ZoomOutput {
        scale: zoom.scale().to_string(),
        label: zoom.label(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
