//! Directory summary of converted scenarios.
//!
//! The simulator locates scenarios through `dataset_summary.pkl`, a map from
//! scenario id to an entry holding the file name and the number of steps.
use crate::{
    error::ConvertError,
    writer::{read_header, write_pickle, SCENARIO_EXT},
};
use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// File name of the directory summary.
pub const SUMMARY_FILE: &str = "dataset_summary.pkl";

/// Returns `true` if the file name denotes a summary file.
pub fn is_summary_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.contains("dataset_summary"))
        .unwrap_or(false)
}

/// Lists scenario files in `dir`, summary files excluded, sorted by path.
pub fn list_scenario_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension().and_then(|e| e.to_str()) == Some(SCENARIO_EXT)
                && !is_summary_file(p)
        })
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// One entry of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub id: String,

    /// File name local to the data directory.
    pub filename: String,

    pub length: usize,

    /// Always empty, the simulator only requires the key.
    pub object_summary: BTreeMap<String, String>,
}

/// Map from scenario id to [`SummaryEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetSummary(BTreeMap<String, SummaryEntry>);

impl DatasetSummary {
    /// Builds the summary of the scenario files in `dir`.
    ///
    /// Files that cannot be read are logged and skipped, as are files without
    /// an id.
    pub fn build(dir: &Path) -> Result<Self> {
        let files = list_scenario_files(dir)?;
        if files.is_empty() {
            return Err(ConvertError::NoScenarioFiles(dir.to_path_buf()).into());
        }

        let mut entries = BTreeMap::new();
        for path in files.iter() {
            let header = match read_header(path) {
                Ok(header) => header,
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    continue;
                }
            };
            let id = match header.id {
                Some(id) if !id.is_empty() => id,
                _ => continue,
            };
            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            entries.insert(
                id.clone(),
                SummaryEntry {
                    id,
                    filename,
                    length: header.length,
                    object_summary: BTreeMap::new(),
                },
            );
        }

        info!(
            "Summarized {} of {} scenario files in {}",
            entries.len(),
            files.len(),
            dir.display()
        );
        Ok(Self(entries))
    }

    /// Builds the summary of `dir` and writes it to `dir/dataset_summary.pkl`.
    pub fn rebuild(dir: &Path) -> Result<Self> {
        let summary = Self::build(dir)?;
        summary.save(dir.join(SUMMARY_FILE))?;
        Ok(summary)
    }

    /// Loads a summary file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(serde_pickle::from_slice(&bytes, serde_pickle::DeOptions::new())?)
    }

    /// Writes the summary.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_pickle(path.as_ref(), self)
    }

    pub fn get(&self, id: &str) -> Option<&SummaryEntry> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SummaryEntry)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{tests::sample_record, NamingPolicy, ScenarioWriter};
    use tempdir::TempDir;

    #[test]
    fn test_summary_lists_written_scenarios() -> Result<()> {
        let dir = TempDir::new("summary")?;
        let writer = ScenarioWriter::new(dir.path(), NamingPolicy::ScenarioId)?;
        writer.write(&sample_record("a"), 0)?;
        writer.write(&sample_record("b"), 1)?;
        fs::write(dir.path().join("broken.pkl"), b"not a pickle")?;

        let summary = DatasetSummary::rebuild(dir.path())?;
        assert_eq!(summary.len(), 2);
        let entry = summary.get("a").unwrap();
        assert_eq!(entry.filename, "sd_waymo_a.pkl");
        assert_eq!(entry.length, 2);
        assert!(entry.object_summary.is_empty());

        // The summary itself is not a scenario file.
        assert_eq!(list_scenario_files(dir.path())?.len(), 3);
        assert_eq!(DatasetSummary::load(dir.path().join(SUMMARY_FILE))?, summary);
        Ok(())
    }

    #[test]
    fn test_rebuild_is_deterministic() -> Result<()> {
        let dir = TempDir::new("summary")?;
        let writer = ScenarioWriter::new(dir.path(), NamingPolicy::Sequential)?;
        for (ix, id) in ["z", "m", "a"].iter().enumerate() {
            writer.write(&sample_record(id), ix)?;
        }
        let path = dir.path().join(SUMMARY_FILE);

        DatasetSummary::rebuild(dir.path())?;
        let first = fs::read(&path)?;
        DatasetSummary::rebuild(dir.path())?;
        let second = fs::read(&path)?;
        assert_eq!(first, second);

        let summary = DatasetSummary::load(&path)?;
        assert_eq!(summary.get("z").unwrap().filename, "sd_waymo_v1.2_0.pkl");
        Ok(())
    }

    #[test]
    fn test_empty_directory_is_an_error() -> Result<()> {
        let dir = TempDir::new("summary")?;
        let err = DatasetSummary::rebuild(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::NoScenarioFiles(_))
        ));
        assert!(!dir.path().join(SUMMARY_FILE).exists());
        Ok(())
    }
}
