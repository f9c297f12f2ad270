//! Collaborator trait and configuration.

use std::time::Duration;

use crate::error::Result;

/// Configuration for external collaborators.
#[derive(Debug, Clone)]
pub struct CollabConfig {
    /// Model to use (e.g., "mistralai/mistral-small-24b-instruct").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Request timeout. A call exceeding this is treated as the
    /// collaborator being unavailable.
    pub timeout: Duration,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            model: "mistralai/mistral-small-24b-instruct".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Trait for external collaborators (code generation, semantic
/// reasoning, quality judgment).
///
/// All three pipeline roles share this single operation; they differ
/// only in the instruction templates they send and in which handle the
/// caller wires into the orchestrator. Implementations must be
/// thread-safe (Send + Sync) so datasets can be processed concurrently.
pub trait Collaborator: Send + Sync {
    /// Send one instruction and return the raw text answer.
    ///
    /// Transport-level failures (network, timeout, non-2xx) surface as
    /// `CollaboratorUnavailable`; an answer that arrives but cannot be
    /// decoded surfaces as `CollaboratorMalformed`. How either is
    /// absorbed is the calling component's policy, not the provider's.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the name of this collaborator (for logging/debugging).
    fn name(&self) -> &str;
}
