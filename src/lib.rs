//! Boolean filter expressions over typed dataset columns.
//!
//! Filter text such as `age > 30 and name = "John"` is validated against a
//! set of declared columns with [`validate`], parsed into a [`Filter`] with
//! [`parse`], and rendered back to text with [`to_text`].
pub mod filter;
pub mod operator;
pub mod parser;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptest_generators;

pub use filter::{Condition, Connector, Filter, Scalar, Value};
pub use operator::{Operator, OperatorClass};
pub use parser::{FilterError, Fragment};
pub use schema::{ColumnDef, ColumnSchema, ColumnType};
pub use validator::{check, parse, validate};

/// Canonical filter text for `filter`. Never fails.
pub fn to_text(filter: &Filter) -> String {
    filter.to_text()
}
