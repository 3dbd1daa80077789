//! Pipeline orchestration: load -> merge -> aggregate -> classify -> write.
//!
//! `run_engine` is the pure batch transform (no I/O, explicit as-of instant).
//! `AnalysisPipeline` wraps it with a source loader and a report writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use prodintel_core::{DomainError, SourceRecord};
use prodintel_inventory::AggregationReport;
use prodintel_observability::{EngineMetrics, MetricsSnapshot};
use prodintel_products::{Associations, merge_associations, merge_catalog};
use prodintel_scoring::{CompetitorContext, ScoredProduct};

use crate::config::EngineConfig;
use crate::report::json_file::render_report;
use crate::report::{ReportError, ReportSummary, ReportWriter};
use crate::sources::{LoadError, SourceBundle, SourceLoader};

/// Normalized inputs for one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInputs {
    pub catalog: Vec<SourceRecord>,
    pub associations: Associations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    /// One record per catalog product, in catalog order.
    pub products: Vec<ScoredProduct>,
    pub aggregation: AggregationReport,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] DomainError),
}

/// Run the integration & scoring engine over an in-memory record set.
///
/// Deterministic for a given input set and `as_of`.
pub fn run_engine(
    inputs: EngineInputs,
    context: &CompetitorContext,
    as_of: DateTime<Utc>,
    config: &EngineConfig,
    metrics: &EngineMetrics,
) -> Result<EngineOutput, DomainError> {
    let aggregator = config.aggregator()?;
    config.scoring.validate()?;
    let classifier = config.classifier();

    let mut index = merge_catalog(inputs.catalog, metrics);
    merge_associations(&mut index, inputs.associations, metrics);

    let aggregation = aggregator.apply(index.as_mut_slice(), as_of, metrics);
    let products = classifier.classify_all(index.into_products(), context, metrics);

    Ok(EngineOutput { products, aggregation })
}

/// Outcome of one full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub as_of: DateTime<Utc>,
    pub summary: ReportSummary,
    pub metrics: MetricsSnapshot,
    pub aggregation: AggregationReport,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: EngineConfig,
}

impl AnalysisPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load, run, write. Only loader/writer failures (or bad config) abort a run.
    pub fn run<L, W>(&self, loader: &L, writer: &W, as_of: DateTime<Utc>) -> Result<PipelineReport, PipelineError>
    where
        L: SourceLoader + ?Sized,
        W: ReportWriter + ?Sized,
    {
        info!(as_of = %as_of, "analysis pipeline starting");

        let SourceBundle {
            catalog,
            associations,
            competitor_context,
        } = loader.load()?;

        let metrics = EngineMetrics::new();
        let output = run_engine(
            EngineInputs { catalog, associations },
            &competitor_context,
            as_of,
            &self.config,
            &metrics,
        )?;

        let summary = match writer.write(&output.products) {
            Ok(summary) => summary,
            Err(e) => {
                dump_unwritten_report(&output.products, &e);
                return Err(e.into());
            }
        };
        let metrics = metrics.snapshot();

        info!(
            total = summary.total,
            high = summary.high,
            medium = summary.medium,
            low = summary.low,
            rejected = metrics.catalog_rejected_missing_id,
            duplicates = metrics.catalog_duplicate_overwrites,
            unmatched = metrics.unmatched_total(),
            "analysis pipeline finished"
        );

        Ok(PipelineReport {
            as_of,
            summary,
            metrics,
            aggregation: output.aggregation,
        })
    }
}

/// Last-resort copy of a report the writer could not persist.
fn dump_unwritten_report(products: &[ScoredProduct], cause: &ReportError) {
    match render_report(products) {
        Ok(body) => error!(
            error = %cause,
            products = products.len(),
            report = %body,
            "report write failed; results follow"
        ),
        Err(e) => error!(
            error = %cause,
            render_error = %e,
            "report write failed and results could not be rendered"
        ),
    }
}
