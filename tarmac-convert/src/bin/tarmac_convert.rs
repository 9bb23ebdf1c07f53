use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use tarmac_convert::{convert, ConvertConfig, IdPolicy, NamingPolicy};

/// Converts raw Waymo scenarios into scenario files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of raw proto-JSON files.
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Output file naming.
    #[arg(long, value_enum)]
    naming: Option<NamingPolicy>,

    /// How scenario identifiers are derived from the raw ids.
    #[arg(long, value_enum)]
    id_policy: Option<IdPolicy>,

    /// Rebuilds dataset_summary.pkl after conversion.
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// YAML configuration, overridden by the other options.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn create_config(args: &Args) -> Result<ConvertConfig> {
    let mut config = match &args.config {
        Some(path) => ConvertConfig::load(path)?,
        None => {
            if args.raw.is_none() || args.out.is_none() {
                return Err(anyhow!("--raw and --out are required without --config"));
            }
            ConvertConfig::default()
        }
    };

    if let Some(raw) = &args.raw {
        config = config.raw_dir(raw);
    }
    if let Some(out) = &args.out {
        config = config.out_dir(out);
    }
    if let Some(workers) = args.workers {
        config = config.workers(workers);
    }
    if let Some(naming) = args.naming {
        config = config.naming(naming);
    }
    if let Some(id_policy) = args.id_policy {
        config = config.id_policy(id_policy);
    }
    if args.summary {
        config = config.summary(true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = create_config(&args)?;
    let report = convert(&config)?;

    println!("Total converted scenarios: {}", report.converted);
    println!("Skipped scenarios: {}", report.skipped);
    if report.overwritten > 0 {
        println!("Overwritten scenario files: {}", report.overwritten);
    }
    Ok(())
}
