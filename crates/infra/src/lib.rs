//! Infrastructure layer: source loading, configuration, pipeline wiring, report output.

pub mod config;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod sources;


pub use config::{ConfigError, EngineConfig};
pub use normalizer::KeyNormalizer;
pub use pipeline::{AnalysisPipeline, EngineInputs, EngineOutput, PipelineError, PipelineReport, run_engine};
pub use report::{JsonFileReportWriter, ReportSummary, ReportWriter};
pub use sources::{DirectorySource, SourceBundle, SourceLoader};
