//! Data references
//!
//! A chart's data is exactly one of inline row values, a URL, a named data
//! source, or a Polars DataFrame. Frames stay frames until compilation, when
//! they are converted to inline row records.

use crate::{ChartError, DataFrame, Result};
use polars::prelude::*;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

schema_enum! {
    /// File format of URL data
    pub enum FormatType: "format type" {
        Csv => "csv",
        Tsv => "tsv",
        Json => "json",
        Topojson => "topojson",
    }
}

/// Parsing hints for URL data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFormat {
    #[serde(rename = "type")]
    pub format_type: FormatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl DataFormat {
    pub fn new(format_type: FormatType) -> Self {
        Self {
            format_type,
            parse: None,
            property: None,
        }
    }

    /// Declare how a field should be parsed (`"number"`, `"date"`, ...)
    pub fn with_parse(mut self, field: impl Into<String>, parse: impl Into<String>) -> Self {
        self.parse
            .get_or_insert_with(Map::new)
            .insert(field.into(), Value::String(parse.into()));
        self
    }
}

/// Data reference for a chart
#[derive(Debug, Clone)]
pub enum Data {
    /// Inline row records
    Values(Vec<Value>),
    /// Data loaded by the renderer from a URL
    Url {
        url: String,
        format: Option<DataFormat>,
    },
    /// Data bound by name at render time
    Named(String),
    /// Tabular frame, converted to row records at compile time
    Frame(DataFrame),
}

impl Data {
    /// Inline row records
    pub fn values(rows: Vec<Value>) -> Self {
        Data::Values(rows)
    }

    /// URL data without format hints
    pub fn url(url: impl Into<String>) -> Self {
        Data::Url {
            url: url.into(),
            format: None,
        }
    }

    /// URL data with explicit format hints
    pub fn url_with_format(url: impl Into<String>, format: DataFormat) -> Self {
        Data::Url {
            url: url.into(),
            format: Some(format),
        }
    }

    /// Named data source
    pub fn named(name: impl Into<String>) -> Self {
        Data::Named(name.into())
    }

    /// Build a data reference from its schema form.
    ///
    /// Accepts `{"values": [...]}`, `{"url": "..."}` (optionally with `format`)
    /// and `{"name": "..."}`, or a bare string which is treated as a URL.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(url) => Ok(Data::url(url)),
            Value::Array(rows) => Ok(Data::Values(rows)),
            Value::Object(mut obj) => {
                let keys: Vec<&str> = ["values", "url", "name"]
                    .into_iter()
                    .filter(|k| obj.contains_key(*k))
                    .collect();
                if keys.len() != 1 {
                    return Err(ChartError::UsageError(format!(
                        "Data must contain exactly one of 'values', 'url' or 'name', found: {}",
                        obj.keys().cloned().collect::<Vec<_>>().join(", ")
                    )));
                }
                match keys[0] {
                    "values" => match obj.remove("values") {
                        Some(Value::Array(rows)) => Ok(Data::Values(rows)),
                        _ => Err(ChartError::UsageError(
                            "Data 'values' must be an array of records".to_string(),
                        )),
                    },
                    "url" => {
                        let url = match obj.remove("url") {
                            Some(Value::String(url)) => url,
                            _ => {
                                return Err(ChartError::UsageError(
                                    "Data 'url' must be a string".to_string(),
                                ))
                            }
                        };
                        let format = match obj.remove("format") {
                            Some(format) => Some(parse_format(format)?),
                            None => None,
                        };
                        Ok(Data::Url { url, format })
                    }
                    _ => match obj.remove("name") {
                        Some(Value::String(name)) => Ok(Data::Named(name)),
                        _ => Err(ChartError::UsageError(
                            "Data 'name' must be a string".to_string(),
                        )),
                    },
                }
            }
            other => Err(ChartError::UsageError(format!(
                "Unsupported data reference: {}",
                other
            ))),
        }
    }

    /// Serialize to exactly one of `{values}`, `{url}` or `{name}`
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Data::Values(rows) => Ok(json!({ "values": rows })),
            Data::Url { url, format } => {
                let mut obj = Map::new();
                obj.insert("url".to_string(), json!(url));
                if let Some(format) = format {
                    obj.insert(
                        "format".to_string(),
                        serde_json::to_value(format).map_err(|e| {
                            ChartError::DataError(format!("Failed to serialize data format: {}", e))
                        })?,
                    );
                }
                Ok(Value::Object(obj))
            }
            Data::Named(name) => Ok(json!({ "name": name })),
            Data::Frame(df) => Ok(json!({ "values": dataframe_to_values(df)? })),
        }
    }

    /// Whether the renderer, not this crate, supplies the rows
    pub fn is_external(&self) -> bool {
        matches!(self, Data::Url { .. } | Data::Named(_))
    }
}

fn parse_format(value: Value) -> Result<DataFormat> {
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(ChartError::UsageError(format!(
                "Data 'format' must be an object, got {}",
                other
            )))
        }
    };
    let format_type = match obj.get("type") {
        Some(Value::String(t)) => t.parse::<FormatType>()?,
        _ => {
            return Err(ChartError::UsageError(
                "Data 'format' requires a 'type'".to_string(),
            ))
        }
    };
    Ok(DataFormat {
        format_type,
        parse: obj.get("parse").and_then(|p| p.as_object()).cloned(),
        property: obj
            .get("property")
            .and_then(|p| p.as_str())
            .map(str::to_string),
    })
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Data::Values(a), Data::Values(b)) => a == b,
            (Data::Url { url: a, format: fa }, Data::Url { url: b, format: fb }) => {
                a == b && fa == fb
            }
            (Data::Named(a), Data::Named(b)) => a == b,
            // Frames compare by the records they compile to
            _ => match (self.to_value(), other.to_value()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl From<&str> for Data {
    fn from(url: &str) -> Self {
        Data::url(url)
    }
}

impl From<String> for Data {
    fn from(url: String) -> Self {
        Data::url(url)
    }
}

impl From<Vec<Value>> for Data {
    fn from(rows: Vec<Value>) -> Self {
        Data::Values(rows)
    }
}

impl From<DataFrame> for Data {
    fn from(df: DataFrame) -> Self {
        Data::Frame(df)
    }
}

impl TryFrom<Value> for Data {
    type Error = ChartError;

    fn try_from(value: Value) -> Result<Self> {
        Data::from_value(value)
    }
}

// =============================================================================
// DataFrame conversion
// =============================================================================

/// Convert a Polars DataFrame to row records (array of objects)
///
/// Categorical and enum columns are emitted as their plain string labels.
pub fn dataframe_to_values(df: &DataFrame) -> Result<Vec<Value>> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| match column.dtype() {
            DataType::Categorical(..) | DataType::Enum(..) => {
                column.cast(&DataType::String).map_err(|e| {
                    ChartError::DataError(format!(
                        "Failed to read categories of column '{}': {}",
                        column.name(),
                        e
                    ))
                })
            }
            _ => Ok(column.clone()),
        })
        .collect::<Result<Vec<_>>>()?;
    let mut values = Vec::with_capacity(df.height());

    for row_idx in 0..df.height() {
        let mut row_obj = Map::new();
        for column in &columns {
            let value = column.get(row_idx).map_err(|e| {
                ChartError::DataError(format!(
                    "Failed to read row {} of column '{}': {}",
                    row_idx,
                    column.name(),
                    e
                ))
            })?;
            row_obj.insert(column.name().to_string(), any_value_to_json(value));
        }
        values.push(Value::Object(row_obj));
    }

    Ok(values)
}

/// Convert a single cell to a JSON value
///
/// Temporal values become ISO strings so the renderer parses them as dates.
fn any_value_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => json!(v),
        AnyValue::String(v) => json!(v),
        AnyValue::StringOwned(v) => json!(v.as_str()),
        AnyValue::Int8(v) => json!(v),
        AnyValue::Int16(v) => json!(v),
        AnyValue::Int32(v) => json!(v),
        AnyValue::Int64(v) => json!(v),
        AnyValue::UInt8(v) => json!(v),
        AnyValue::UInt16(v) => json!(v),
        AnyValue::UInt32(v) => json!(v),
        AnyValue::UInt64(v) => json!(v),
        AnyValue::Float32(v) => json!(v),
        AnyValue::Float64(v) => json!(v),
        AnyValue::Date(days) => {
            // Days since epoch to "YYYY-MM-DD"
            match chrono::DateTime::from_timestamp(i64::from(days) * 86_400, 0) {
                Some(dt) => json!(dt.date_naive().format("%Y-%m-%d").to_string()),
                None => Value::Null,
            }
        }
        AnyValue::Datetime(timestamp, time_unit, _) => {
            let micros = match time_unit {
                TimeUnit::Microseconds => Some(timestamp),
                TimeUnit::Milliseconds => timestamp.checked_mul(1_000),
                TimeUnit::Nanoseconds => Some(timestamp / 1_000),
            };
            let datetime = micros.and_then(|micros| {
                let secs = micros.div_euclid(1_000_000);
                let nsecs = (micros.rem_euclid(1_000_000) * 1_000) as u32;
                chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nsecs)
            });
            match datetime {
                Some(dt) => json!(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
                None => Value::Null,
            }
        }
        AnyValue::Time(nanos) => {
            // Nanoseconds since midnight to "HH:MM:SS.sss"
            let hours = nanos / 3_600_000_000_000;
            let minutes = (nanos % 3_600_000_000_000) / 60_000_000_000;
            let seconds = (nanos % 60_000_000_000) / 1_000_000_000;
            let millis = (nanos % 1_000_000_000) / 1_000_000;
            json!(format!(
                "{:02}:{:02}:{:02}.{:03}",
                hours, minutes, seconds, millis
            ))
        }
        other => json!(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_data() {
        let data = Data::from("/path/to/my/data.csv");
        assert_eq!(data.to_value().unwrap(), json!({"url": "/path/to/my/data.csv"}));
        assert!(data.is_external());
    }

    #[test]
    fn test_url_data_with_format() {
        let data = Data::url_with_format(
            "data.csv",
            DataFormat::new(FormatType::Csv).with_parse("date", "date"),
        );
        assert_eq!(
            data.to_value().unwrap(),
            json!({"url": "data.csv", "format": {"type": "csv", "parse": {"date": "date"}}})
        );
    }

    #[test]
    fn test_inline_values_from_mapping() {
        let mapping = json!({"values": [{"x": 1, "y": 2}, {"x": 2, "y": 3}]});
        let data = Data::try_from(mapping.clone()).unwrap();
        assert_eq!(data.to_value().unwrap(), mapping);
    }

    #[test]
    fn test_named_data() {
        let data = Data::try_from(json!({"name": "Foo"})).unwrap();
        assert_eq!(data, Data::named("Foo"));
        assert_eq!(data.to_value().unwrap(), json!({"name": "Foo"}));
    }

    #[test]
    fn test_ambiguous_mapping_rejected() {
        let err = Data::try_from(json!({"url": "a.csv", "name": "Foo"})).unwrap_err();
        assert!(matches!(err, ChartError::UsageError(_)));
        assert!(Data::try_from(json!({"rows": []})).is_err());
        assert!(Data::try_from(json!(3)).is_err());
    }

    #[test]
    fn test_frame_to_records() {
        let df = df! {
            "x" => &[0i64, 1, 2],
            "y" => &[0.5f64, 1.5, 2.5],
            "c" => &["a", "b", "c"],
        }
        .unwrap();
        let data = Data::from(df);
        assert_eq!(
            data.to_value().unwrap(),
            json!({"values": [
                {"x": 0, "y": 0.5, "c": "a"},
                {"x": 1, "y": 1.5, "c": "b"},
                {"x": 2, "y": 2.5, "c": "c"},
            ]})
        );
    }

    #[test]
    fn test_frame_nulls() {
        let df = df! {
            "x" => &[Some(1i32), None],
            "s" => &[None, Some("b")],
        }
        .unwrap();
        let values = dataframe_to_values(&df).unwrap();
        assert_eq!(values[0]["x"], 1);
        assert_eq!(values[0]["s"], Value::Null);
        assert_eq!(values[1]["x"], Value::Null);
        assert_eq!(values[1]["s"], "b");
    }

    #[test]
    fn test_frame_dates_to_iso() {
        let dates = Series::new("d".into(), &[0i32, 19723])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();
        let values = dataframe_to_values(&df).unwrap();
        assert_eq!(values[0]["d"], "1970-01-01");
        assert_eq!(values[1]["d"], "2024-01-01");
    }

    #[test]
    fn test_frame_datetime_to_iso() {
        let ts = Series::new("t".into(), &[1_704_067_200_000i64])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![ts.into()]).unwrap();
        let values = dataframe_to_values(&df).unwrap();
        assert_eq!(values[0]["t"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_frame_datetime_out_of_range_is_null() {
        let ts = Series::new("t".into(), &[i64::MAX, 0])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![ts.into()]).unwrap();
        let values = dataframe_to_values(&df).unwrap();
        assert_eq!(values[0]["t"], Value::Null);
        assert_eq!(values[1]["t"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_frame_categorical_labels() {
        let cats = Series::new("c".into(), &["a", "b", "a"])
            .cast(&DataType::from_categories(Categories::global()))
            .unwrap();
        let df = DataFrame::new(vec![cats.into()]).unwrap();
        let values = dataframe_to_values(&df).unwrap();
        assert_eq!(
            values,
            vec![json!({"c": "a"}), json!({"c": "b"}), json!({"c": "a"})]
        );
    }

    #[test]
    fn test_frames_compare_structurally() {
        let a = df! { "x" => &[1, 2] }.unwrap();
        let b = df! { "x" => &[1, 2] }.unwrap();
        let c = df! { "x" => &[1, 3] }.unwrap();
        assert_eq!(Data::from(a.clone()), Data::from(b));
        assert_ne!(Data::from(a), Data::from(c));
    }
}
