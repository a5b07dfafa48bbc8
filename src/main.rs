use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svgpng::{AppConfig, SvgToPngConverter};

#[derive(Parser)]
#[command(name = "svgpng")]
#[command(about = "Convert SVG images to transparent PNG")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an SVG file to an RGBA PNG file
    Convert {
        /// Input SVG file
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output size multiplier (e.g., 2 for double size)
        #[arg(short, long)]
        scale: Option<f32>,

        #[command(flatten)]
        backends: BackendArgs,
    },
    /// Show which rendering backends are enabled
    Backends {
        #[command(flatten)]
        backends: BackendArgs,
    },
}

#[derive(Args)]
struct BackendArgs {
    /// Config file (YAML). Can also be set with the SVGPNG_CONFIG environment variable.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the primary (resvg) backend
    #[arg(long)]
    no_primary: bool,

    /// Disable the secondary (vector drawing) backend
    #[arg(long)]
    no_secondary: bool,
}

impl BackendArgs {
    /// Config file, then CLI overrides
    fn resolve_config(&self) -> AppConfig {
        let path = self
            .config
            .clone()
            .or_else(|| std::env::var("SVGPNG_CONFIG").ok().map(PathBuf::from));
        let mut config = AppConfig::load(path.as_deref());

        if self.no_primary {
            config.backends.primary = false;
        }
        if self.no_secondary {
            config.backends.secondary = false;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svgpng=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            scale,
            backends,
        } => {
            let mut config = backends.resolve_config();
            if let Some(scale) = scale {
                config.render.scale = scale;
            }
            run_convert_command(&config, &input, &output)
        }
        Commands::Backends { backends } => {
            run_backends_command(&backends.resolve_config());
            Ok(())
        }
    }
}

/// Convert one SVG file and write the result as PNG
fn run_convert_command(config: &AppConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let svg_data = std::fs::read(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;

    let converter = SvgToPngConverter::from_config(config);
    let image = converter
        .convert(&svg_data)
        .map_err(|e| anyhow::anyhow!("Conversion failed: {e}"))?;

    let png_bytes = image.to_png()?;
    std::fs::write(output, &png_bytes)?;
    println!(
        "Converted {} -> {} ({}x{}, {} bytes)",
        input.display(),
        output.display(),
        image.width(),
        image.height(),
        png_bytes.len()
    );

    Ok(())
}

fn run_backends_command(config: &AppConfig) {
    let status = |enabled: bool| if enabled { "enabled" } else { "disabled" };

    println!("svgpng v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  primary   (resvg):   {}", status(config.backends.primary));
    println!("  secondary (drawing): {}", status(config.backends.secondary));
    if !config.backends.any() {
        println!();
        println!("  No backend enabled: SVG conversion is unavailable.");
    }
}
