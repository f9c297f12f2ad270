//! Mock collaborator for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{RefineryError, Result};

use super::provider::Collaborator;

/// Mock collaborator that replays scripted responses for testing.
///
/// Responses are returned in order, one per `complete` call; once the
/// script is exhausted further calls return an empty answer, which the
/// pipeline treats as a malformed response. Every received prompt is
/// recorded for assertions.
pub struct MockCollaborator {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    default: Option<String>,
    failure: Option<String>,
}

impl MockCollaborator {
    /// Create a mock that replays the given responses in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            default: None,
            failure: None,
        }
    }

    /// Create a mock that always answers with the same response.
    pub fn answering(response: impl Into<String>) -> Self {
        let mut mock = Self::with_responses(std::iter::empty::<String>());
        mock.default = Some(response.into());
        mock
    }

    /// Create a mock whose every call fails as unavailable.
    pub fn unavailable(message: impl Into<String>) -> Self {
        let mut mock = Self::with_responses(std::iter::empty::<String>());
        mock.failure = Some(message.into());
        mock
    }

    /// Prompts received so far, in call order.
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Collaborator for MockCollaborator {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(ref message) = self.failure {
            return Err(RefineryError::CollaboratorUnavailable {
                collaborator: self.name().to_string(),
                message: message.clone(),
            });
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.default.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
