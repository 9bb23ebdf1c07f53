use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tarmac_convert::{DatasetSummary, SUMMARY_FILE};

/// Rebuilds the dataset summary of a directory of scenario files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of scenario files.
    #[arg(long)]
    data: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let summary = DatasetSummary::rebuild(&args.data)?;
    println!(
        "Wrote {} entries to {}",
        summary.len(),
        args.data.join(SUMMARY_FILE).display()
    );
    Ok(())
}
