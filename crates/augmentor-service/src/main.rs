use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use augmentor_core::{AugmentConfig, OperationSetting, TransformOptions, VideoOptions};
use augmentor_service::api::{self, ProcessRequest, ProcessVideoRequest, Reply};
use augmentor_service::Service;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "augmentor", version, about = "Batch image augmentation and frame extraction")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the upload directory.
    #[arg(long, global = true)]
    uploads: Option<PathBuf>,

    /// Override the processed-files directory.
    #[arg(long, global = true)]
    processed: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store an image or video in the upload directory.
    Upload(UploadArgs),
    /// Apply the image transforms to an uploaded image.
    Process(ProcessArgs),
    /// Extract frames from an uploaded video.
    Video(VideoArgs),
    /// Copy a processed file (usually a zip) out of the processed directory.
    Download(DownloadArgs),
    /// Show suggested output locations.
    Paths,
}

#[derive(Parser, Debug)]
struct UploadArgs {
    /// File to upload.
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Stored upload name, as printed by `upload`.
    #[arg(long)]
    filename: String,

    /// JSON file with the selected options.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Zoom factors; replaces the options file value.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    zoom: Option<Vec<f64>>,

    #[arg(long)]
    output_folder: Option<String>,

    #[arg(long)]
    custom_output_path: Option<String>,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Stored upload name, as printed by `upload`.
    #[arg(long)]
    filename: String,

    /// Start time in seconds.
    #[arg(long)]
    start: Option<f64>,

    /// End time in seconds; defaults to the end of the video.
    #[arg(long)]
    end: Option<f64>,

    /// Sampling interval in seconds; repeat for several passes.
    #[arg(long = "interval", value_delimiter = ',', num_args = 1..)]
    intervals: Vec<f64>,

    #[arg(long)]
    output_folder: Option<String>,

    #[arg(long)]
    custom_output_path: Option<String>,
}

#[derive(Parser, Debug)]
struct DownloadArgs {
    /// File name inside the processed directory.
    name: String,

    /// Destination directory.
    #[arg(long, default_value = ".")]
    to: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let service = Service::new(config).context("initialize storage")?;

    let reply = match cli.cmd {
        Command::Upload(args) => cmd_upload(&service, &args)?,
        Command::Process(args) => cmd_process(&service, args)?,
        Command::Video(args) => cmd_video(&service, args),
        Command::Download(args) => cmd_download(&service, &args)?,
        Command::Paths => api::reply(&Ok::<_, augmentor_core::AugmentError>(
            service.output_paths(),
        )),
    };

    let rendered = serde_json::to_string_pretty(&reply.body)?;
    if reply.is_success() {
        println!("{rendered}");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{rendered}");
        Ok(ExitCode::FAILURE)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file values, then command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<AugmentConfig> {
    let mut config = match &cli.config {
        Some(path) => AugmentConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => AugmentConfig::default(),
    };
    if let Some(dir) = &cli.uploads {
        config.storage.upload_dir = dir.clone();
    }
    if let Some(dir) = &cli.processed {
        config.storage.processed_dir = dir.clone();
    }
    Ok(config)
}

fn cmd_upload(service: &Service, args: &UploadArgs) -> anyhow::Result<Reply> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("read '{}'", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(api::reply(&service.upload(&name, &bytes)))
}

fn cmd_process(service: &Service, args: ProcessArgs) -> anyhow::Result<Reply> {
    let mut options = match &args.options {
        Some(path) => read_options(path)?,
        None => TransformOptions::default(),
    };
    if let Some(zoom) = args.zoom {
        options.zoom = Some(OperationSetting::enabled(zoom));
    }

    let request = ProcessRequest {
        filename: args.filename,
        output_folder: args.output_folder,
        custom_output_path: args.custom_output_path,
        selected_options: options,
    };
    Ok(api::reply(&service.process(&request)))
}

fn read_options(path: &Path) -> anyhow::Result<TransformOptions> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read options '{}'", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse options '{}'", path.display()))
}

fn cmd_video(service: &Service, args: VideoArgs) -> Reply {
    let request = ProcessVideoRequest {
        filename: args.filename,
        output_folder: args.output_folder,
        custom_output_path: args.custom_output_path,
        start_time: args.start,
        end_time: args.end,
        selected_options: VideoOptions {
            interval_enabled: None,
            intervals: (!args.intervals.is_empty()).then_some(args.intervals),
        },
    };
    api::reply(&service.process_video(&request))
}

fn cmd_download(service: &Service, args: &DownloadArgs) -> anyhow::Result<Reply> {
    let result = service.download(&args.name);
    if let Ok(file) = &result {
        std::fs::create_dir_all(&args.to)
            .with_context(|| format!("create output dir '{}'", args.to.display()))?;
        let dest = args.to.join(&file.filename);
        std::fs::copy(&file.path, &dest)
            .with_context(|| format!("copy to '{}'", dest.display()))?;
        tracing::info!(dest = %dest.display(), bytes = file.size, "downloaded");
    }
    Ok(api::reply(&result))
}
