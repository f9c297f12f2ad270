//! Sandboxed execution of generated cleaning procedures.
//!
//! Procedures are written in a tiny assignment-and-call language (see
//! [`script`]). The executor resolves calls against an allow-listed
//! operation registry, so a procedure cannot touch the filesystem, the
//! network, or anything beyond its private dataset copy.

mod executor;
pub mod script;

pub use executor::{DATASET_REF, SandboxedExecutor};
