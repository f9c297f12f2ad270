//! External collaborator handles and instruction templates.
//!
//! The pipeline talks to three external collaborators (code generation,
//! semantic reasoning, quality judgment) through one trait; the caller
//! decides which concrete provider backs each role.

mod mock;
mod openai;
pub mod prompts;
mod provider;

pub use mock::MockCollaborator;
pub use openai::OpenAiCompatible;
pub use provider::{CollabConfig, Collaborator};
