use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use snapmark::capture::export::{ExportFormat, default_output_path, save_image};
use snapmark::capture::image::BaseImage;
use snapmark::config::SnapmarkConfig;
use snapmark::session::CanvasSession;
use snapmark::session::messages::parse_script;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
    Tiff,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Jpeg => ExportFormat::Jpeg,
            FormatArg::Tiff => ExportFormat::Tiff,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "snapmark", about = "Annotate a screenshot from a scripted edit session")]
struct Cli {
    /// Image to annotate
    input: PathBuf,

    /// JSON array of edit messages to replay
    #[arg(long, short)]
    script: Option<PathBuf>,

    /// Output file; defaults to a timestamped file in the save location
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Output format; guessed from the output extension when omitted
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Config file to use instead of the default location
    #[arg(long, env = "SNAPMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Render the live preview (selection and overlays) instead of the export
    #[arg(long)]
    live: bool,

    /// Persist the style palette left by the script as the new defaults
    #[arg(long)]
    remember_style: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SnapmarkConfig::load_from(path)?,
        None => SnapmarkConfig::load(),
    };
    let base = BaseImage::open(&cli.input)?;
    let mut session = CanvasSession::from_config(base, &config);

    if let Some(path) = &cli.script {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let msgs = parse_script(&text)
            .with_context(|| format!("failed to parse script {}", path.display()))?;
        log::info!("Replaying {} edit messages", msgs.len());
        for msg in msgs {
            session.update(msg);
        }
    }

    if cli.remember_style {
        let path = cli
            .config
            .clone()
            .or_else(SnapmarkConfig::default_path)
            .context("could not determine a config location")?;
        let updated = SnapmarkConfig {
            palette: session.canvas.palette.clone(),
            ..config.clone()
        };
        updated.save_to(&path)?;
        log::info!("Saved style defaults to {}", path.display());
    }

    let rendered = if cli.live {
        session.render_live()
    } else {
        session.render_final()
    }
    .context("nothing to render: the export region is empty")?;

    let format = cli
        .format
        .map(ExportFormat::from)
        .or_else(|| cli.output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or(config.export_format);
    let output = match cli.output {
        Some(path) => path,
        None => default_output_path(config.save_location, format)
            .context("could not determine an output directory")?,
    };
    let quality = cli.quality.unwrap_or(config.jpeg_quality);
    save_image(&rendered, &output, format, quality)?;
    println!("{}", output.display());
    Ok(())
}
