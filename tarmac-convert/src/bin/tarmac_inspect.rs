use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tarmac_convert::{pipeline::discover_inputs, JsonScenarioSource};

/// Shows the top-level keys of the first raw record.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of raw proto-JSON files.
    #[arg(long)]
    raw: PathBuf,
}

fn first_record(path: &Path) -> Result<serde_json::Value> {
    let rdr = BufReader::new(File::open(path)?);
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_reader(rdr)?),
        _ => {
            for line in rdr.lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    return Ok(serde_json::from_str(&line)?);
                }
            }
            Err(anyhow!("{} holds no record", path.display()))
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let files = discover_inputs(&JsonScenarioSource, &args.raw)?;
    let path = files
        .first()
        .ok_or_else(|| anyhow!("No input file under {}", args.raw.display()))?;
    let record = first_record(path).with_context(|| format!("reading {}", path.display()))?;

    let object = record
        .as_object()
        .ok_or_else(|| anyhow!("First record of {} is not an object", path.display()))?;
    info!("File: {}", path.display());
    for key in object.keys() {
        info!("  {}", key);
    }
    info!("Has metadata: {}", object.contains_key("metadata"));
    Ok(())
}
