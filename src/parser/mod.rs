pub mod ast;
pub mod error;
pub mod fragment;
pub mod raw;

// Re-exports for clean API
pub use ast::{test_utils, ItemKind, RawCondition, RawFilter, RawItem, RawValue};
pub use error::{FilterError, SpanExt};
pub use fragment::Fragment;
pub use raw::{RawParser, Rule};
