//! Conversion of Waymo motion scenarios into simulator scenario files.
//!
//! Raw scenarios are read as proto-JSON through a [`RawRecordSource`]. The
//! [`ScenarioAssembler`] turns each of them into a [`ScenarioRecord`], which a
//! [`ScenarioWriter`] pickles into one file per scenario. The simulator finds
//! the files through the [`DatasetSummary`] of the output directory.
//!
//! [`convert`] runs the whole batch over a directory of raw files:
//!
//! ```no_run
//! use tarmac_convert::{convert, ConvertConfig, NamingPolicy};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ConvertConfig::default()
//!     .raw_dir("/data/waymo/raw")
//!     .out_dir("/data/waymo/scenarios")
//!     .naming(NamingPolicy::ScenarioId)
//!     .summary(true);
//! let report = convert(&config)?;
//! println!("{} scenarios", report.converted);
//! # Ok(())
//! # }
//! ```
pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod raw;
pub mod scenario;
pub mod summary;
pub mod writer;

pub use assemble::{IdPolicy, ScenarioAssembler};
pub use config::ConvertConfig;
pub use error::ConvertError;
pub use pipeline::{convert, convert_with_source, ConversionReport, FileReport};
pub use raw::{JsonScenarioSource, RawRecordSource, RawScenario};
pub use scenario::{MapFeature, ObjectType, ScenarioRecord, StateSeries, Track};
pub use summary::{DatasetSummary, SummaryEntry, SUMMARY_FILE};
pub use writer::{read_header, read_scenario, NamingPolicy, ScenarioWriter};
