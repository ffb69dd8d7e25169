use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use raw10_develop::image_pipeline::{
    BatchProcessor, BayerPattern, PackedRaw10Reader, ProcessingConfig, TiffCompression, decode,
    raw::RAW10_MAX,
};
use raw10_develop::logger;

#[derive(Parser)]
#[command(name = "raw10-develop", version, about = "Develop packed RAW10 sensor dumps into 16-bit TIFFs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every frame in the input directory
    Process(ProcessArgs),
    /// Decode a single frame and report its statistics
    Inspect(InspectArgs),
}

#[derive(Args)]
struct GeometryArgs {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Frame height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Bytes per packed row (inferred from the file size when omitted)
    #[arg(long)]
    stride: Option<usize>,

    /// Receiver row alignment an inferred stride must match
    #[arg(long)]
    stride_alignment: Option<usize>,
}

#[derive(Args)]
struct ProcessArgs {
    #[command(flatten)]
    geometry: GeometryArgs,

    /// Directory holding the packed frames
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory receiving the TIFFs
    #[arg(long)]
    output: Option<PathBuf>,

    /// Colour filter arrangement of the sensor
    #[arg(long, value_enum)]
    pattern: Option<BayerPattern>,

    /// Keep the output linear
    #[arg(long)]
    no_gamma: bool,

    /// Worker threads
    #[arg(long)]
    jobs: Option<usize>,

    #[arg(long, value_enum)]
    compression: Option<TiffCompression>,
}

#[derive(Args)]
struct InspectArgs {
    /// Packed frame to decode
    file: PathBuf,

    #[command(flatten)]
    geometry: GeometryArgs,
}

fn base_config(args: &GeometryArgs) -> Result<ProcessingConfig> {
    let base = match &args.config {
        Some(path) => ProcessingConfig::from_file(path)?,
        None => ProcessingConfig::default(),
    };

    let mut builder = ProcessingConfig::builder();
    if args.width.is_some() || args.height.is_some() {
        builder = builder.geometry(
            args.width.unwrap_or(base.width),
            args.height.unwrap_or(base.height),
        );
    }
    if args.stride.is_some() {
        builder = builder.stride(args.stride);
    }
    if let Some(alignment) = args.stride_alignment {
        builder = builder.stride_alignment(alignment);
    }
    Ok(builder.build_on(base))
}

fn process(args: ProcessArgs) -> Result<bool> {
    let base = base_config(&args.geometry)?;

    let mut builder = ProcessingConfig::builder();
    if let Some(input) = args.input {
        builder = builder.input_dir(input);
    }
    if let Some(output) = args.output {
        builder = builder.output_dir(output);
    }
    if let Some(pattern) = args.pattern {
        builder = builder.pattern(pattern);
    }
    if args.no_gamma {
        builder = builder.gamma(false);
    }
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }
    if let Some(compression) = args.compression {
        builder = builder.compression(compression);
    }
    let config = builder.build_on(base);

    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        "Geometry {}x{}, pattern {}, gamma {}",
        config.width,
        config.height,
        config.pattern.as_str(),
        if config.gamma { "enabled" } else { "disabled" }
    );

    let batch = BatchProcessor::new(config).context("invalid configuration")?;
    let report = batch.run().context("batch aborted")?;
    report.log_summary();
    Ok(report.is_clean())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let config = base_config(&args.geometry)?;
    config.validate()?;

    let data = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let reader = PackedRaw10Reader::new(config.width, config.height, config.stride)
        .with_alignment(config.stride_alignment);
    let frame = reader.frame(&data)?;
    let plane = decode(&frame).with_context(|| format!("decoding {}", args.file.display()))?;
    let stats = plane.stats();

    info!(
        file = %args.file.display(),
        "{}x{}, stride {} bytes ({} padding per row)",
        frame.width,
        frame.height,
        frame.stride,
        frame.padding_per_row()
    );
    info!(
        "samples={} min={} max={} mean={:.1} saturated={} (>= {})",
        stats.count, stats.min, stats.max, stats.mean, stats.saturated, RAW10_MAX
    );
    Ok(())
}

fn main() -> Result<()> {
    logger::init("info");

    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => {
            if !process(args)? {
                error!("Some frames failed to convert");
                std::process::exit(1);
            }
        }
        Command::Inspect(args) => inspect(args)?,
    }
    Ok(())
}
