//! Configuration of the conversion pipeline.
use crate::{
    assemble::IdPolicy,
    scenario::{DATASET_NAME, SCENARIO_VERSION},
    writer::NamingPolicy,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`convert`](crate::pipeline::convert).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ConvertConfig {
    /// Directory of raw scenario files.
    pub raw_dir: PathBuf,

    /// Directory where scenario files are written.
    pub out_dir: PathBuf,

    /// Number of worker threads.
    pub workers: usize,

    pub naming: NamingPolicy,

    pub id_policy: IdPolicy,

    /// Value of `metadata.dataset`.
    pub dataset: String,

    /// Value of `version`.
    pub version: String,

    /// Rebuilds the directory summary after conversion.
    pub summary: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw"),
            out_dir: PathBuf::from("scenarios"),
            workers: 4,
            naming: NamingPolicy::default(),
            id_policy: IdPolicy::default(),
            dataset: DATASET_NAME.to_string(),
            version: SCENARIO_VERSION.to_string(),
            summary: false,
        }
    }
}

impl ConvertConfig {
    /// Sets the directory of raw files.
    pub fn raw_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.raw_dir = v.into();
        self
    }

    /// Sets the output directory.
    pub fn out_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.out_dir = v.into();
        self
    }

    /// Sets the number of worker threads.
    pub fn workers(mut self, v: usize) -> Self {
        self.workers = v;
        self
    }

    /// Sets the naming policy of output files.
    pub fn naming(mut self, v: NamingPolicy) -> Self {
        self.naming = v;
        self
    }

    /// Sets the identifier policy.
    pub fn id_policy(mut self, v: IdPolicy) -> Self {
        self.id_policy = v;
        self
    }

    /// Sets the dataset name.
    pub fn dataset(mut self, v: impl Into<String>) -> Self {
        self.dataset = v.into();
        self
    }

    /// Sets the format version.
    pub fn version(mut self, v: impl Into<String>) -> Self {
        self.version = v.into();
        self
    }

    /// Enables rebuilding the summary.
    pub fn summary(mut self, v: bool) -> Self {
        self.summary = v;
        self
    }

    /// Constructs [`ConvertConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ConvertConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
