//! Refinery: agentic cleaning pipeline for tabular datasets.
//!
//! Refinery cleans datasets by asking an external code-generation
//! collaborator to synthesize a cleaning procedure, executing that
//! procedure inside a capability-scoped sandbox, and falling back to a
//! deterministic rule-based cleaner whenever generation or execution
//! fails. A reasoning collaborator gates whether datasets can be
//! processed together, and a judgment collaborator reviews every
//! cleaned output.
//!
//! # Core Principles
//!
//! - **Degrade, never fail**: a broken or hostile procedure costs only
//!   the generated path; the fallback cleaner always produces output
//! - **Contained execution**: procedures run in a language whose only
//!   capabilities are allow-listed tabular operations
//! - **Full provenance**: every output records how it was produced and
//!   what the quality judge said about it
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use indexmap::IndexMap;
//! use refinery::{Collaborators, OpenAiCompatible, Refinery, TabularDataset};
//!
//! let provider = Arc::new(OpenAiCompatible::from_env().unwrap());
//! let refinery = Refinery::new(Collaborators::uniform(provider));
//!
//! let table = TabularDataset::from_csv_str("name,age\nAlice,30\n").unwrap();
//! let report = refinery.run(&IndexMap::from([("people.csv".to_string(), table)]));
//!
//! for dataset in &report.datasets {
//!     println!("{}: {:?}", dataset.name, dataset.provenance);
//! }
//! ```

pub mod cleaning;
pub mod codegen;
pub mod collab;
pub mod dataset;
pub mod error;
pub mod feasibility;
pub mod quality;
pub mod sandbox;

mod refinery;

pub use crate::refinery::{
    Collaborators, DatasetReport, Provenance, Refinery, RefineryConfig, RunReport,
};
pub use cleaning::FallbackCleaner;
pub use codegen::{CleaningCodeGenerator, GeneratedProcedure, GenerationOutcome};
pub use collab::{CollabConfig, Collaborator, MockCollaborator, OpenAiCompatible};
pub use dataset::{ColumnKind, SampleBrief, SchemaSampler, TabularDataset};
pub use error::{RefineryError, Result};
pub use feasibility::{FeasibilityAnalyzer, FeasibilityResult};
pub use quality::{QualityChecker, Verdict};
pub use sandbox::SandboxedExecutor;
