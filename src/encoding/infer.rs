//! Field type inference from attached data
//!
//! Frames are inspected through their column dtype. Inline row records are
//! inspected through the first non-null value of the field. URL and named data
//! carry no type information.

use crate::schema::{Data, FieldType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{DataFrame, DataType};
use serde_json::Value;

/// Infer the semantic type of `field` from `data`, if the data can tell
pub fn infer_field_type(data: &Data, field: &str) -> Option<FieldType> {
    match data {
        Data::Frame(df) => infer_from_frame(df, field),
        Data::Values(rows) => infer_from_values(rows, field),
        Data::Url { .. } | Data::Named(_) => None,
    }
}

/// Column names available for inference, used in error messages
pub fn available_fields(data: &Data) -> Vec<String> {
    match data {
        Data::Frame(df) => df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect(),
        Data::Values(rows) => {
            let mut names: Vec<String> = rows
                .iter()
                .filter_map(Value::as_object)
                .flat_map(|row| row.keys().cloned())
                .collect();
            names.sort();
            names.dedup();
            names
        }
        Data::Url { .. } | Data::Named(_) => Vec::new(),
    }
}

fn infer_from_frame(df: &DataFrame, field: &str) -> Option<FieldType> {
    let column = df.column(field).ok()?;
    Some(dtype_field_type(column.dtype()))
}

/// Map a Polars dtype to a semantic field type
pub fn dtype_field_type(dtype: &DataType) -> FieldType {
    use DataType::*;
    match dtype {
        Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 | Float32 | Float64 => {
            FieldType::Quantitative
        }
        Date | Datetime(_, _) | Time => FieldType::Temporal,
        _ => FieldType::Nominal,
    }
}

fn infer_from_values(rows: &[Value], field: &str) -> Option<FieldType> {
    let mut present = false;
    for row in rows {
        match row.get(field) {
            Some(Value::Null) => present = true,
            Some(value) => return Some(value_field_type(value)),
            None => {}
        }
    }
    // An all-null column is still a known field
    present.then_some(FieldType::Nominal)
}

fn value_field_type(value: &Value) -> FieldType {
    match value {
        Value::Number(_) => FieldType::Quantitative,
        Value::String(s) if is_temporal_string(s) => FieldType::Temporal,
        _ => FieldType::Nominal,
    }
}

/// ISO-8601 date or datetime, with or without offset
fn is_temporal_string(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
}
