//! Sources of scenario records.
use crate::{error::EnvError, SimulatorConfig};
use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};
use tarmac_convert::{read_scenario, summary::list_scenario_files, ScenarioRecord};

/// An indexed collection of scenarios.
pub trait ScenarioProvider {
    /// Opens the provider configured for a simulator.
    fn open(config: &SimulatorConfig) -> Result<Self>
    where
        Self: Sized;

    /// Number of scenarios, at least 1.
    fn len(&self) -> usize;

    /// Returns `true` if there is no scenario.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// File name of the `ix`-th scenario.
    fn filename(&self, ix: usize) -> &str;

    /// Loads the `ix`-th scenario.
    fn load(&self, ix: usize) -> Result<ScenarioRecord>;
}

/// Scenario files of a directory, in sorted order.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    dir: PathBuf,
    files: Vec<String>,
}

impl DirectoryProvider {
    /// Lists the scenario files of `dir`.
    ///
    /// Fails if there is none.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let files = list_scenario_files(&dir)?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect::<Vec<_>>();
        if files.is_empty() {
            return Err(EnvError::NoScenarioFiles(dir).into());
        }
        info!("Found {} scenario files in {}", files.len(), dir.display());
        Ok(Self { dir, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ScenarioProvider for DirectoryProvider {
    fn open(config: &SimulatorConfig) -> Result<Self> {
        Self::scan(&config.data_directory)
    }

    fn len(&self) -> usize {
        self.files.len()
    }

    fn filename(&self, ix: usize) -> &str {
        &self.files[ix]
    }

    fn load(&self, ix: usize) -> Result<ScenarioRecord> {
        read_scenario(&self.dir.join(&self.files[ix]))
    }
}
