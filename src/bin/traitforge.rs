use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "traitforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a layers folder and print what it contains.
    Inspect(InspectArgs),
    /// Generate unique artworks and write them as a zip archive or a folder.
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Folder whose sub-folders are the layers.
    #[arg(long)]
    layers: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Folder whose sub-folders are the layers.
    #[arg(long)]
    layers: PathBuf,

    /// JSON generation config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of unique items to generate.
    #[arg(long)]
    count: Option<u32>,

    /// Items per progress batch.
    #[arg(long)]
    batch_size: Option<u32>,

    /// Output image side length in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// RNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Random draws per item before scanning for unused combinations.
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Resampling filter used to stretch layers.
    #[arg(long, value_enum)]
    filter: Option<FilterChoice>,

    /// Prefix for item names in metadata.json.
    #[arg(long)]
    name_prefix: Option<String>,

    /// Also write metadata.json.
    #[arg(long)]
    metadata: bool,

    /// Output zip path.
    #[arg(long, default_value = traitforge::DEFAULT_ARCHIVE_NAME)]
    out: PathBuf,

    /// Write files unpacked into this folder instead of a zip archive.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<FilterChoice> for traitforge::ResizeFilter {
    fn from(choice: FilterChoice) -> Self {
        match choice {
            FilterChoice::Nearest => Self::Nearest,
            FilterChoice::Triangle => Self::Triangle,
            FilterChoice::CatmullRom => Self::CatmullRom,
            FilterChoice::Lanczos3 => Self::Lanczos3,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let mut session = traitforge::Session::new();
    let summary = session.upload_dir(&args.layers)?;

    println!("{summary}");
    for (name, variants) in &summary.layers {
        println!("  {name}: {variants} variants");
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let file_cfg = match &args.config {
        Some(path) => traitforge::GenerateConfig::from_path(path)?,
        None => traitforge::GenerateConfig::default(),
    };
    let flag_cfg = traitforge::GenerateConfig {
        total_count: args.count,
        batch_size: args.batch_size,
        image_size: args.size,
        seed: args.seed,
        max_attempts_per_slot: args.max_attempts,
        item_name_prefix: args.name_prefix.clone(),
        write_metadata: args.metadata.then_some(true),
        resize_filter: args.filter.map(Into::into),
    };
    let params = file_cfg.merge(flag_cfg).into_params()?;

    let mut session = traitforge::Session::new();
    let summary = session.upload_dir(&args.layers)?;
    eprintln!("{summary}");

    let mut progress = Progress;
    let run = session.generate(&params, &mut progress)?;
    let generated = run.items.len();

    match &args.out_dir {
        Some(dir) => {
            run.bundle.write_dir(dir)?;
            eprintln!("wrote {generated} items to {}", dir.display());
        }
        None => {
            run.bundle.write_zip(&args.out)?;
            eprintln!("wrote {generated} items to {}", args.out.display());
        }
    }
    Ok(())
}

/// Logs one line per finished batch.
struct Progress;

impl traitforge::GenerationObserver for Progress {
    fn batch_finished(&mut self, generated: u32, total: u32) {
        tracing::info!("generated {generated}/{total}");
    }
}
