//! Quality gate: judgment-collaborator review of a cleaned dataset.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collab::{Collaborator, prompts};
use crate::dataset::TabularDataset;

/// A quality verdict over one cleaned dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub accepted: bool,
    pub rationale: String,
}

/// Sends a fully serialized cleaned dataset to the judgment collaborator
/// and interprets its GOOD/BAD (or ACCEPTABLE/UNACCEPTABLE) answer.
///
/// Fails closed: if the collaborator is unreachable or its answer does
/// not lead with GOOD or BAD, the dataset is not accepted. The verdict is
/// advisory; the orchestrator records it but still emits the dataset.
pub struct QualityChecker {
    collab: Arc<dyn Collaborator>,
}

impl QualityChecker {
    pub fn new(collab: Arc<dyn Collaborator>) -> Self {
        Self { collab }
    }

    pub fn check(&self, table: &TabularDataset) -> Verdict {
        let csv = match table.to_csv_string() {
            Ok(csv) => csv,
            Err(e) => {
                return Verdict {
                    accepted: false,
                    rationale: format!("dataset could not be serialized for review: {}", e),
                };
            }
        };

        let raw = match self.collab.complete(&prompts::quality_prompt(&csv)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(collaborator = self.collab.name(), error = %e, "quality call failed");
                return Verdict {
                    accepted: false,
                    rationale: format!("quality collaborator unavailable: {}", e),
                };
            }
        };

        let verdict = parse_verdict(&raw);
        info!(accepted = verdict.accepted, "quality verdict recorded");
        verdict
    }
}

// Longest tokens first so "UNACCEPTABLE" is never read as "ACCEPTABLE"
// plus trailing text.
const VERDICT_TOKENS: &[(&str, bool)] = &[
    ("UNACCEPTABLE", false),
    ("ACCEPTABLE", true),
    ("GOOD", true),
    ("BAD", false),
];

fn parse_verdict(raw: &str) -> Verdict {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();

    for &(token, accepted) in VERDICT_TOKENS {
        let Some(rest) = upper.strip_prefix(token) else {
            continue;
        };
        // The token must stand alone, not open a longer word.
        if rest.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        let rest = &trimmed[trimmed.len() - rest.len()..];
        let rationale = rest
            .trim_start()
            .trim_start_matches([':', '.', ',', '-'])
            .trim();
        return Verdict {
            accepted,
            rationale: if rationale.is_empty() {
                "no rationale given".to_string()
            } else {
                rationale.to_string()
            },
        };
    }

    Verdict {
        accepted: false,
        rationale: format!("uninterpretable quality answer: '{}'", trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::MockCollaborator;

    fn cleaned_table() -> TabularDataset {
        TabularDataset::new(
            vec!["name".to_string(), "age".to_string()],
            vec![vec!["Alice".to_string(), "30".to_string()]],
        )
        .unwrap()
    }

    #[test]
    fn test_good_verdict_accepted() {
        let mock = Arc::new(MockCollaborator::answering(
            "GOOD. Columns intact, no missing values remain.",
        ));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(verdict.accepted);
        assert!(verdict.rationale.contains("Columns intact"));
    }

    #[test]
    fn test_bad_verdict_rejected_with_rationale() {
        let mock = Arc::new(MockCollaborator::answering(
            "BAD: the age column still contains null sentinels.",
        ));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(!verdict.accepted);
        assert!(verdict.rationale.contains("null sentinels"));
    }

    #[test]
    fn test_acceptable_token_accepted() {
        let mock = Arc::new(MockCollaborator::answering(
            "ACCEPTABLE. Columns intact, nothing missing.",
        ));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(verdict.accepted);
        assert!(verdict.rationale.contains("Columns intact"));
    }

    #[test]
    fn test_unacceptable_token_rejected() {
        let mock = Arc::new(MockCollaborator::answering(
            "Unacceptable - duplicate rows remain.",
        ));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(!verdict.accepted);
        assert!(verdict.rationale.contains("duplicate rows"));
    }

    #[test]
    fn test_token_must_stand_alone() {
        let mock = Arc::new(MockCollaborator::answering("Goodness knows"));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(!verdict.accepted);
        assert!(verdict.rationale.contains("uninterpretable"));
    }

    #[test]
    fn test_lowercase_answer_parsed() {
        let mock = Arc::new(MockCollaborator::answering("good - looks fine"));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(verdict.accepted);
    }

    #[test]
    fn test_uninterpretable_answer_fails_closed() {
        let mock = Arc::new(MockCollaborator::answering("Looks mostly okay to me"));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(!verdict.accepted);
        assert!(verdict.rationale.contains("uninterpretable"));
    }

    #[test]
    fn test_unreachable_collaborator_fails_closed() {
        let mock = Arc::new(MockCollaborator::unavailable("timeout"));
        let verdict = QualityChecker::new(mock).check(&cleaned_table());
        assert!(!verdict.accepted);
        assert!(verdict.rationale.contains("unavailable"));
    }

    #[test]
    fn test_prompt_carries_full_dataset() {
        let mock = Arc::new(MockCollaborator::answering("GOOD. Fine."));
        QualityChecker::new(mock.clone()).check(&cleaned_table());
        let prompts = mock.received_prompts();
        assert!(prompts[0].contains("name,age"));
        assert!(prompts[0].contains("Alice,30"));
    }
}
