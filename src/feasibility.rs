//! Feasibility gate: decides whether a set of datasets can be processed
//! as one corpus.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::collab::{Collaborator, prompts};
use crate::dataset::{SchemaSampler, TabularDataset};

/// Outcome of a feasibility check. `detail` records why the decision
/// came out the way it did, including collaborator failures.
#[derive(Debug, Clone)]
pub struct FeasibilityResult {
    pub feasible: bool,
    pub detail: String,
}

impl FeasibilityResult {
    fn negative(detail: impl Into<String>) -> Self {
        Self {
            feasible: false,
            detail: detail.into(),
        }
    }
}

/// Asks the reasoning collaborator whether the named datasets are
/// semantically connected enough to process together.
///
/// The gate fails closed: an unreachable collaborator or an answer whose
/// leading token is none of TRUE/YES/FALSE/NO counts as not feasible.
pub struct FeasibilityAnalyzer {
    collab: Arc<dyn Collaborator>,
    sampler: SchemaSampler,
}

impl FeasibilityAnalyzer {
    pub fn new(collab: Arc<dyn Collaborator>, sample_rows: usize) -> Self {
        Self {
            collab,
            sampler: SchemaSampler::new(sample_rows),
        }
    }

    pub fn analyze(&self, datasets: &IndexMap<String, TabularDataset>) -> FeasibilityResult {
        if datasets.is_empty() {
            return FeasibilityResult::negative("no datasets to assess");
        }

        let briefs: Vec<(String, String)> = datasets
            .iter()
            .map(|(name, table)| (name.clone(), self.sampler.brief(table).to_prompt_string()))
            .collect();
        let prompt = prompts::feasibility_prompt(&briefs);

        let raw = match self.collab.complete(&prompt) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(collaborator = self.collab.name(), error = %e, "feasibility call failed");
                return FeasibilityResult::negative(format!(
                    "feasibility collaborator unavailable: {}",
                    e
                ));
            }
        };

        let result = match parse_answer(&raw) {
            Some(true) => FeasibilityResult {
                feasible: true,
                detail: "datasets assessed as jointly processable".to_string(),
            },
            Some(false) => FeasibilityResult::negative("datasets assessed as unrelated"),
            None => FeasibilityResult::negative(format!(
                "uninterpretable feasibility answer: '{}'",
                truncate(raw.trim(), 80)
            )),
        };

        info!(feasible = result.feasible, detail = %result.detail, "feasibility decided");
        result
    }
}

const ANSWER_TOKENS: &[(&str, bool)] = &[
    ("TRUE", true),
    ("YES", true),
    ("FALSE", false),
    ("NO", false),
];

/// Classify the leading token of the collaborator's answer,
/// case-insensitively. The token must stand alone ("NONE" is not "NO").
fn parse_answer(raw: &str) -> Option<bool> {
    let upper = raw.trim().to_ascii_uppercase();
    for &(token, feasible) in ANSWER_TOKENS {
        let Some(rest) = upper.strip_prefix(token) else {
            continue;
        };
        if rest.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        return Some(feasible);
    }
    None
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
