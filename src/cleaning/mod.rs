//! Cleaning rules and the deterministic fallback cleaner.

mod fallback;
pub mod rules;

pub use fallback::FallbackCleaner;
