//! Cleaning-procedure generation via the code-generation collaborator.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::collab::{Collaborator, prompts};
use crate::dataset::{SchemaSampler, TabularDataset};

/// An untrusted transformation procedure returned by the code-generation
/// collaborator. Carries a content digest for the processing record;
/// trust is established only by the sandbox's output contract.
#[derive(Debug, Clone)]
pub struct GeneratedProcedure {
    text: String,
    digest: String,
}

impl GeneratedProcedure {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let digest = format!("sha256:{:x}", hasher.finalize());
        Self { text, digest }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Outcome of one generation attempt. Transport failures and empty
/// answers are not errors here; they mean "no procedure available" and
/// the orchestrator falls back.
#[derive(Debug)]
pub enum GenerationOutcome {
    Procedure(GeneratedProcedure),
    Unavailable(String),
}

/// Asks the code-generation collaborator for a cleaning procedure, built
/// from a bounded sample of the dataset.
pub struct CleaningCodeGenerator {
    collab: Arc<dyn Collaborator>,
    sampler: SchemaSampler,
}

impl CleaningCodeGenerator {
    pub fn new(collab: Arc<dyn Collaborator>, sample_rows: usize) -> Self {
        Self {
            collab,
            sampler: SchemaSampler::new(sample_rows),
        }
    }

    /// Request a procedure for one dataset. Never returns an error:
    /// every failure mode collapses to `Unavailable`.
    pub fn generate(&self, table: &TabularDataset) -> GenerationOutcome {
        let brief = self.sampler.brief(table);
        let prompt = prompts::cleaning_prompt(&brief);

        let raw = match self.collab.complete(&prompt) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(collaborator = self.collab.name(), error = %e, "generation call failed");
                return GenerationOutcome::Unavailable(e.to_string());
            }
        };

        let text = strip_code_fences(&raw);
        if text.trim().is_empty() {
            return GenerationOutcome::Unavailable(
                "collaborator returned an empty procedure".to_string(),
            );
        }

        let procedure = GeneratedProcedure::new(text);
        debug!(digest = procedure.digest(), "procedure generated");
        GenerationOutcome::Procedure(procedure)
    }
}

/// Strip markdown code-fence wrapping from a collaborator response,
/// including a leading language tag line inside the fence.
pub(crate) fn strip_code_fences(response: &str) -> String {
    let inner = if response.contains("```") {
        response.split("```").nth(1).unwrap_or(response)
    } else {
        response
    };

    // Drop a bare language tag ("python", "text", ...) left on the
    // fence's opening line.
    let inner = match inner.split_once('\n') {
        Some((first, rest))
            if !first.trim().is_empty()
                && first.trim().chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            rest
        }
        _ => inner,
    };

    inner.trim().to_string()
}
