//! Errors in the conversion crate.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No raw scenario files found under {0}")]
    NoInputFiles(PathBuf),

    #[error("No scenario files found in {0}")]
    NoScenarioFiles(PathBuf),

    #[error("Worker thread panicked")]
    WorkerPanicked,
}
