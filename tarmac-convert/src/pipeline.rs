//! Batch conversion of a directory of raw files.
use crate::{
    assemble::ScenarioAssembler,
    config::ConvertConfig,
    error::ConvertError,
    raw::{JsonScenarioSource, RawRecordSource},
    summary::DatasetSummary,
    writer::{NamingPolicy, ScenarioWriter},
};
use anyhow::Result;
use crossbeam_channel::unbounded;
use log::{info, trace, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

/// Outcome of converting one raw file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Raw records read, corrupt ones included.
    pub seen: usize,

    /// Scenario files written.
    pub converted: usize,

    /// Records rejected by the assembler.
    pub skipped: usize,

    /// Records that could not be decoded.
    pub corrupt: usize,

    /// Scenario files that replaced an existing file of the same name.
    pub overwritten: usize,
}

/// Outcome of [`convert`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Number of input files.
    pub files: usize,
    pub converted: usize,
    pub skipped: usize,
    pub corrupt: usize,
    pub overwritten: usize,

    /// One message per input file that failed, sorted.
    pub failures: Vec<String>,
}

impl ConversionReport {
    fn add(&mut self, report: &FileReport) {
        self.converted += report.converted;
        self.skipped += report.skipped;
        self.corrupt += report.corrupt;
        self.overwritten += report.overwritten;
    }
}

/// Lists the input files under `raw_dir`.
///
/// Only the top level is scanned unless it holds no accepted file, in which
/// case the whole tree is searched.
pub fn discover_inputs(source: &dyn RawRecordSource, raw_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(raw_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| source.accepts(p))
        .collect::<Vec<_>>();

    if files.is_empty() {
        walk(source, raw_dir, &mut files)?;
    }
    if files.is_empty() {
        return Err(ConvertError::NoInputFiles(raw_dir.to_path_buf()).into());
    }

    files.sort();
    Ok(files)
}

fn walk(source: &dyn RawRecordSource, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(source, &path, files)?;
        } else if source.accepts(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Converts every record of one raw file.
///
/// `start_index` is the stream position of the first record of the file.
pub fn convert_file(
    source: &dyn RawRecordSource,
    assembler: &ScenarioAssembler,
    writer: &ScenarioWriter,
    path: &Path,
    start_index: usize,
) -> Result<FileReport> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let mut report = FileReport::default();

    for (offset, raw) in source.open(path)?.enumerate() {
        let index = start_index + offset;
        report.seen += 1;

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Corrupt record {} in {}: {:#}", offset, path.display(), e);
                report.corrupt += 1;
                continue;
            }
        };

        match assembler.assemble(&raw, &name, offset) {
            Some(record) => {
                if writer.path_of(&record, index).exists() {
                    warn!(
                        "Scenario {} from {} overwrites {}",
                        record.id,
                        path.display(),
                        writer.path_of(&record, index).display()
                    );
                    report.overwritten += 1;
                }
                let out = writer.write(&record, index)?;
                trace!("Wrote {}", out.display());
                report.converted += 1;
            }
            None => report.skipped += 1,
        }
    }

    Ok(report)
}

/// Converts the raw files of `config.raw_dir` with the proto-JSON reader.
pub fn convert(config: &ConvertConfig) -> Result<ConversionReport> {
    convert_with_source(config, Arc::new(JsonScenarioSource))
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Converts the raw files of `config.raw_dir` read by `source`.
///
/// ```mermaid
/// flowchart LR
///   A[discover_inputs] -->|paths| B[(job channel)]
///   B --> W1[worker 1]
///   B --> W2[worker n]
///   W1 -->|FileReport| C[(result channel)]
///   W2 -->|FileReport| C
///   C --> D[ConversionReport]
/// ```
///
/// With [`NamingPolicy::Sequential`] the files are converted one after the
/// other in sorted order so that indices follow the record stream.
pub fn convert_with_source(
    config: &ConvertConfig,
    source: Arc<dyn RawRecordSource>,
) -> Result<ConversionReport> {
    let files = discover_inputs(source.as_ref(), &config.raw_dir)?;
    let assembler = ScenarioAssembler::default()
        .id_policy(config.id_policy)
        .dataset(config.dataset.clone())
        .version(config.version.clone());
    let writer = ScenarioWriter::new(&config.out_dir, config.naming)?;
    info!(
        "Converting {} files from {} into {}",
        files.len(),
        config.raw_dir.display(),
        config.out_dir.display()
    );

    let mut report = match config.naming {
        NamingPolicy::Sequential => run_sequential(source.as_ref(), &assembler, &writer, &files),
        NamingPolicy::ScenarioId => {
            run_parallel(source, assembler, writer, &files, config.workers)
        }
    };
    report.files = files.len();
    report.failures.sort();

    for failure in report.failures.iter() {
        warn!("{}", failure);
    }
    info!(
        "Converted {} scenarios from {} files, skipped {}, corrupt {}, overwritten {}, failed files {}",
        report.converted,
        report.files,
        report.skipped,
        report.corrupt,
        report.overwritten,
        report.failures.len()
    );

    if config.summary {
        DatasetSummary::rebuild(&config.out_dir)?;
    }

    Ok(report)
}

fn failure(path: &Path, e: anyhow::Error) -> String {
    format!("Error in {}: {:#}", path.display(), e)
}

fn run_sequential(
    source: &dyn RawRecordSource,
    assembler: &ScenarioAssembler,
    writer: &ScenarioWriter,
    files: &[PathBuf],
) -> ConversionReport {
    let mut report = ConversionReport::default();
    let mut index = 0;

    for path in files.iter() {
        match convert_file(source, assembler, writer, path, index) {
            Ok(r) => {
                index += r.seen;
                report.add(&r);
            }
            Err(e) => report.failures.push(failure(path, e)),
        }
    }

    report
}

fn run_parallel(
    source: Arc<dyn RawRecordSource>,
    assembler: ScenarioAssembler,
    writer: ScenarioWriter,
    files: &[PathBuf],
    workers: usize,
) -> ConversionReport {
    let n_workers = workers.clamp(1, files.len().max(1));
    let (job_s, job_r) = unbounded::<PathBuf>();
    let (result_s, result_r) = unbounded::<std::result::Result<FileReport, String>>();

    for path in files.iter() {
        // The receiver lives until the workers are joined.
        let _ = job_s.send(path.clone());
    }
    drop(job_s);

    let handles = (0..n_workers)
        .map(|i| {
            let job_r = job_r.clone();
            let result_s = result_s.clone();
            let source = source.clone();
            let assembler = assembler.clone();
            let writer = writer.clone();
            thread::spawn(move || {
                for path in job_r.iter() {
                    trace!("Worker {} converts {}", i, path.display());
                    let result = convert_file(source.as_ref(), &assembler, &writer, &path, 0)
                        .map_err(|e| failure(&path, e));
                    if result_s.send(result).is_err() {
                        break;
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    drop(result_s);

    let mut report = ConversionReport::default();
    for result in result_r.iter() {
        match result {
            Ok(r) => report.add(&r),
            Err(msg) => report.failures.push(msg),
        }
    }

    for handle in handles {
        if handle.join().is_err() {
            report
                .failures
                .push(ConvertError::WorkerPanicked.to_string());
        }
    }

    report
}
