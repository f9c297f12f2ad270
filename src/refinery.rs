//! Pipeline orchestrator: feasibility gate, per-dataset cleaning, and
//! quality review.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cleaning::FallbackCleaner;
use crate::codegen::{CleaningCodeGenerator, GenerationOutcome};
use crate::collab::Collaborator;
use crate::dataset::TabularDataset;
use crate::feasibility::FeasibilityAnalyzer;
use crate::quality::{QualityChecker, Verdict};
use crate::sandbox::SandboxedExecutor;

/// Tunable parameters for a pipeline run.
#[derive(Debug, Clone)]
pub struct RefineryConfig {
    /// Rows included in each dataset sample sent to collaborators.
    pub sample_rows: usize,
    /// Skewness magnitude at which the fallback cleaner imputes by
    /// median instead of mean.
    pub skew_threshold: f64,
    /// Statement budget for a generated procedure.
    pub max_statements: usize,
    /// Wall-clock budget for executing one generated procedure.
    pub exec_timeout: Duration,
}

impl Default for RefineryConfig {
    fn default() -> Self {
        Self {
            sample_rows: 5,
            skew_threshold: 1.0,
            max_statements: 128,
            exec_timeout: Duration::from_secs(5),
        }
    }
}

/// The three collaborator roles the pipeline consults. The same handle
/// may back more than one role.
#[derive(Clone)]
pub struct Collaborators {
    /// Synthesizes cleaning procedures.
    pub generation: Arc<dyn Collaborator>,
    /// Assesses cross-dataset feasibility.
    pub reasoning: Arc<dyn Collaborator>,
    /// Judges cleaned output quality.
    pub judgment: Arc<dyn Collaborator>,
}

impl Collaborators {
    /// Use one collaborator for all three roles.
    pub fn uniform(collab: Arc<dyn Collaborator>) -> Self {
        Self {
            generation: collab.clone(),
            reasoning: collab.clone(),
            judgment: collab,
        }
    }
}

/// How a dataset's cleaned output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A generated procedure executed within the sandbox contract.
    Generated,
    /// The deterministic rule-based cleaner.
    Fallback,
}

/// Processing record for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub name: String,
    pub cleaned: TabularDataset,
    pub provenance: Provenance,
    /// Content digest of the executed procedure, when one was used.
    pub procedure_digest: Option<String>,
    pub verdict: Verdict,
}

/// Record of one full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Whether the feasibility gate let the run proceed.
    pub proceeded: bool,
    /// Rationale behind the feasibility decision.
    pub feasibility_detail: String,
    /// One report per input dataset; empty when the gate blocked.
    pub datasets: Vec<DatasetReport>,
    pub completed_at: DateTime<Utc>,
}

/// The cleaning pipeline.
///
/// A run first asks the reasoning collaborator whether the input
/// datasets can be processed together (fail-closed). Each dataset is
/// then cleaned by a generated procedure executed in the sandbox; any
/// failure along that path is absorbed by the rule-based fallback, so
/// cleaning itself never fails. Finally the judgment collaborator
/// reviews each output; its verdict is recorded but the cleaned data is
/// emitted either way.
pub struct Refinery {
    config: RefineryConfig,
    generator: CleaningCodeGenerator,
    analyzer: FeasibilityAnalyzer,
    checker: QualityChecker,
    executor: SandboxedExecutor,
    fallback: FallbackCleaner,
}

impl Refinery {
    pub fn new(collabs: Collaborators) -> Self {
        Self::with_config(collabs, RefineryConfig::default())
    }

    pub fn with_config(collabs: Collaborators, config: RefineryConfig) -> Self {
        Self {
            generator: CleaningCodeGenerator::new(collabs.generation, config.sample_rows),
            analyzer: FeasibilityAnalyzer::new(collabs.reasoning, config.sample_rows),
            checker: QualityChecker::new(collabs.judgment),
            executor: SandboxedExecutor::new(config.max_statements, config.exec_timeout),
            fallback: FallbackCleaner::new(config.skew_threshold),
            config,
        }
    }

    pub fn config(&self) -> &RefineryConfig {
        &self.config
    }

    /// Run the full pipeline over a set of named datasets. Datasets are
    /// processed in insertion order.
    pub fn run(&self, datasets: &IndexMap<String, TabularDataset>) -> RunReport {
        let feasibility = self.analyzer.analyze(datasets);
        if !feasibility.feasible {
            info!(detail = %feasibility.detail, "run blocked at feasibility gate");
            return RunReport {
                proceeded: false,
                feasibility_detail: feasibility.detail,
                datasets: Vec::new(),
                completed_at: Utc::now(),
            };
        }

        let reports = datasets
            .iter()
            .map(|(name, table)| self.process_dataset(name, table))
            .collect();

        RunReport {
            proceeded: true,
            feasibility_detail: feasibility.detail,
            datasets: reports,
            completed_at: Utc::now(),
        }
    }

    /// Clean one dataset and collect its quality verdict.
    pub fn process_dataset(&self, name: &str, table: &TabularDataset) -> DatasetReport {
        let (cleaned, provenance, digest) = self.clean(name, table);
        let verdict = self.checker.check(&cleaned);

        info!(
            dataset = name,
            provenance = ?provenance,
            accepted = verdict.accepted,
            "dataset processed"
        );

        DatasetReport {
            name: name.to_string(),
            cleaned,
            provenance,
            procedure_digest: digest,
            verdict,
        }
    }

    fn clean(
        &self,
        name: &str,
        table: &TabularDataset,
    ) -> (TabularDataset, Provenance, Option<String>) {
        match self.generator.generate(table) {
            GenerationOutcome::Procedure(procedure) => {
                match self.executor.execute(&procedure, table) {
                    Ok(cleaned) => {
                        return (
                            cleaned,
                            Provenance::Generated,
                            Some(procedure.digest().to_string()),
                        );
                    }
                    Err(e) => {
                        warn!(dataset = name, error = %e, "generated procedure rejected, falling back");
                    }
                }
            }
            GenerationOutcome::Unavailable(reason) => {
                warn!(dataset = name, reason = %reason, "no procedure available, falling back");
            }
        }

        (self.fallback.clean(table), Provenance::Fallback, None)
    }
}
