//! Dataset value types and sampling.

mod brief;
mod kind;
mod table;

pub use brief::{SampleBrief, SchemaSampler};
pub use kind::{ColumnKind, NumericSummary, infer_kind};
pub use table::TabularDataset;
