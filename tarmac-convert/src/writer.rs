//! Persistence of scenario records.
use crate::scenario::{ScenarioRecord, SCENARIO_VERSION};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_pickle::{DeOptions, SerOptions};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Extension of scenario files.
pub const SCENARIO_EXT: &str = "pkl";

/// How output files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamingPolicy {
    /// `sd_waymo_<id>.pkl`, path separators in the id replaced by `_`.
    #[default]
    ScenarioId,

    /// `sd_waymo_v1.2_<index>.pkl`, where the index is the position of the
    /// raw record in the whole input stream.
    Sequential,
}

impl NamingPolicy {
    /// File name of a record.
    pub fn file_name(&self, record: &ScenarioRecord, index: usize) -> String {
        match self {
            NamingPolicy::ScenarioId => {
                let id = record.id.replace(&['/', '\\'][..], "_");
                format!("sd_waymo_{}.{}", id, SCENARIO_EXT)
            }
            NamingPolicy::Sequential => {
                format!("sd_{}_{}.{}", SCENARIO_VERSION, index, SCENARIO_EXT)
            }
        }
    }
}

/// Writes scenario records, one file per record.
#[derive(Debug, Clone)]
pub struct ScenarioWriter {
    out_dir: PathBuf,
    naming: NamingPolicy,
}

impl ScenarioWriter {
    /// Creates a writer, creating `out_dir` if needed.
    pub fn new(out_dir: impl AsRef<Path>, naming: NamingPolicy) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;
        Ok(Self { out_dir, naming })
    }

    /// Path of the file a record is written to.
    pub fn path_of(&self, record: &ScenarioRecord, index: usize) -> PathBuf {
        self.out_dir.join(self.naming.file_name(record, index))
    }

    /// Writes a record and returns the path of the file.
    ///
    /// `index` is used by [`NamingPolicy::Sequential`] only.
    pub fn write(&self, record: &ScenarioRecord, index: usize) -> Result<PathBuf> {
        let path = self.path_of(record, index);
        write_pickle(&path, record)?;
        Ok(path)
    }
}

/// Pickles `value` into the file at `path`.
///
/// Sequences are written as plain lists and tuples. The simulator expects
/// arrays, so scenario files go through the injection path of the
/// environment, which converts them, rather than its own directory loader.
pub fn write_pickle<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut wtr = BufWriter::new(file);
    serde_pickle::to_writer(&mut wtr, value, SerOptions::new())
        .with_context(|| format!("pickling {}", path.display()))?;
    wtr.flush()?;
    Ok(())
}

fn read_pickle<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_pickle::from_reader(BufReader::new(file), DeOptions::new())
        .with_context(|| format!("unpickling {}", path.display()))
}

/// Loads a scenario record.
pub fn read_scenario(path: &Path) -> Result<ScenarioRecord> {
    read_pickle(path)
}

/// The fields of a scenario file needed for indexing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordHeader {
    /// Scenario id.
    #[serde(default)]
    pub id: Option<String>,

    /// Number of timestamps.
    #[serde(default)]
    pub length: usize,
}

/// Loads the header of a scenario file without decoding tracks and map.
pub fn read_header(path: &Path) -> Result<RecordHeader> {
    read_pickle(path)
}
