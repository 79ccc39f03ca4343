//! Schema object model for Vega-Lite v2 documents
//!
//! Each Vega-Lite schema definition that user code can build is modelled as a
//! closed Rust type rather than a keyword-driven dictionary:
//!
//! - `types` - Closed value sets: channels, field types, aggregates, time units
//! - `mark` - Mark types and mark definitions with properties
//! - `data` - Data references (inline values, URL, named, tabular frame)
//! - `transform` - Transform variants emitted in declaration order
//! - `resolve` - Axis/legend/scale resolution maps for composite charts
//! - `validate` - Rule-based validation of compiled documents
//!
//! Typed values reject unknown strings when parsed, naming the offending
//! value and the allowed alternatives. Compiled documents are checked a second
//! time by [`validate()`], which reports the JSON path of the first violation.

pub mod data;
pub mod mark;
pub mod resolve;
pub mod transform;
pub mod types;
pub mod validate;

pub use data::{Data, DataFormat, FormatType};
pub use mark::{Mark, MarkDef};
pub use resolve::{Resolve, ResolveKind, ResolveMap, ResolveMode};
pub use transform::{
    AggregateTransform, AggregatedField, Bin, BinParams, BinTransform, CalculateTransform,
    FilterTransform, LookupData, LookupTransform, Names, Predicate, TimeUnitTransform, Transform,
};
pub use types::{Aggregate, Channel, FieldType, TimeUnit};
pub use validate::validate;

use crate::ChartError;

/// Build the error returned when a string is not one of a schema enum's values
pub(crate) fn invalid_value(kind: &str, value: &str, allowed: &[&str]) -> ChartError {
    ChartError::SchemaError {
        path: kind.to_string(),
        message: format!(
            "'{}' is not a valid {}. Allowed values: {}",
            value,
            kind,
            allowed.join(", ")
        ),
    }
}
