//! Presenter posture analysis over a stream of tracked keypoint frames.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use presenter_posture::config::Config;
use presenter_posture::io;
use presenter_posture::pipeline::PosturePipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON Lines file of tracked frames ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// File to write JSON Lines frame reports to ("-" for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Override the leaning tilt threshold in degrees
    #[arg(long)]
    tilt_threshold: Option<f64>,

    /// Override the leaning window size in frames
    #[arg(long)]
    window_size: Option<usize>,

    /// Override the keypoint visibility threshold
    #[arg(long)]
    visibility_threshold: Option<f64>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Presenter Posture Analysis");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(tilt) = args.tilt_threshold {
        config.thresholds.leaning_tilt_threshold = tilt;
    }
    if let Some(size) = args.window_size {
        config.thresholds.leaning_window_size = size;
    }
    if let Some(visibility) = args.visibility_threshold {
        config.thresholds.visibility_threshold = visibility;
    }

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let mut pipeline = PosturePipeline::new(config).context("Invalid configuration")?;
    let mut source = io::open_source(&args.input).with_context(|| format!("Failed to open input {}", args.input))?;
    let mut sink = io::open_sink(&args.output).with_context(|| format!("Failed to open output {}", args.output))?;

    let frames = pipeline.run(&mut source, &mut sink)?;
    if source.skipped() > 0 {
        warn!("Skipped {} malformed input lines", source.skipped());
    }
    info!("Processed {frames} frames");

    Ok(())
}
