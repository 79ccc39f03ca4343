//! Transform variants
//!
//! Transforms attach to a chart as an ordered sequence and are emitted in that
//! order. Each variant serializes under its schema keys; Rust-side names that
//! collide with keywords or differ in case are aliased (`as_` → `as`,
//! `time_unit` → `timeUnit`).

use super::data::Data;
use super::types::{Aggregate, TimeUnit};
use crate::selection::SelectionExpr;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// One or several output field names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Names {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names::One(name.to_string())
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names::One(name)
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Names::Many(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Names::Many(names.into_iter().map(str::to_string).collect())
    }
}

/// A single transform step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Transform {
    Aggregate(AggregateTransform),
    Bin(BinTransform),
    Calculate(CalculateTransform),
    Filter(FilterTransform),
    Lookup(LookupTransform),
    TimeUnit(TimeUnitTransform),
}

impl Transform {
    /// Schema key that identifies this transform kind
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::Aggregate(_) => "aggregate",
            Transform::Bin(_) => "bin",
            Transform::Calculate(_) => "calculate",
            Transform::Filter(_) => "filter",
            Transform::Lookup(_) => "lookup",
            Transform::TimeUnit(_) => "timeUnit",
        }
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Output field of an aggregate transform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedField {
    pub op: Aggregate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "as")]
    pub as_: String,
}

impl AggregatedField {
    pub fn new(op: Aggregate, field: Option<&str>, as_: impl Into<String>) -> Self {
        Self {
            op,
            field: field.map(str::to_string),
            as_: as_.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTransform {
    pub aggregate: Vec<AggregatedField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groupby: Vec<String>,
}

// =============================================================================
// Bin
// =============================================================================

/// Binning parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BinParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxbins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minstep: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divide: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,
}

impl BinParams {
    pub fn maxbins(maxbins: u32) -> Self {
        Self {
            maxbins: Some(maxbins),
            ..Self::default()
        }
    }

    /// The parameters that are set, as a JSON object
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(maxbins) = self.maxbins {
            obj.insert("maxbins".to_string(), json!(maxbins));
        }
        if let Some(step) = self.step {
            obj.insert("step".to_string(), json!(step));
        }
        if let Some(steps) = &self.steps {
            obj.insert("steps".to_string(), json!(steps));
        }
        if let Some(minstep) = self.minstep {
            obj.insert("minstep".to_string(), json!(minstep));
        }
        if let Some(base) = self.base {
            obj.insert("base".to_string(), json!(base));
        }
        if let Some(divide) = &self.divide {
            obj.insert("divide".to_string(), json!(divide));
        }
        if let Some(extent) = self.extent {
            obj.insert("extent".to_string(), json!(extent));
        }
        if let Some(nice) = self.nice {
            obj.insert("nice".to_string(), json!(nice));
        }
        Value::Object(obj)
    }
}

/// `bin: true` or explicit binning parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bin {
    Flag(bool),
    Params(BinParams),
}

impl Bin {
    pub fn to_value(&self) -> Value {
        match self {
            Bin::Flag(flag) => Value::Bool(*flag),
            Bin::Params(params) => params.to_value(),
        }
    }
}

impl From<bool> for Bin {
    fn from(flag: bool) -> Self {
        Bin::Flag(flag)
    }
}

impl From<BinParams> for Bin {
    fn from(params: BinParams) -> Self {
        Bin::Params(params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinTransform {
    pub bin: Bin,
    pub field: String,
    #[serde(rename = "as")]
    pub as_: String,
}

// =============================================================================
// Calculate / Filter
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculateTransform {
    pub calculate: String,
    #[serde(rename = "as")]
    pub as_: String,
}

/// Filter predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Predicate {
    /// Vega expression string, e.g. `datum.a < 4`
    Expr(String),
    /// Rows inside an interactive selection
    Selection { selection: SelectionExpr },
    /// Field equal to a value
    Equal { field: String, equal: Value },
    /// Field within an inclusive range
    Range { field: String, range: [Value; 2] },
    /// Field one of several values
    OneOf {
        field: String,
        #[serde(rename = "oneOf")]
        one_of: Vec<Value>,
    },
}

impl From<&str> for Predicate {
    fn from(expr: &str) -> Self {
        Predicate::Expr(expr.to_string())
    }
}

impl From<String> for Predicate {
    fn from(expr: String) -> Self {
        Predicate::Expr(expr)
    }
}

impl From<SelectionExpr> for Predicate {
    fn from(selection: SelectionExpr) -> Self {
        Predicate::Selection { selection }
    }
}

impl From<&crate::selection::Selection> for Predicate {
    fn from(selection: &crate::selection::Selection) -> Self {
        Predicate::Selection {
            selection: selection.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterTransform {
    pub filter: Predicate,
}

// =============================================================================
// Lookup
// =============================================================================

/// Secondary data source for a lookup transform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupData {
    pub data: Data,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl LookupData {
    pub fn new(data: impl Into<Data>, key: impl Into<String>, fields: Vec<&str>) -> Self {
        Self {
            data: data.into(),
            key: key.into(),
            fields: if fields.is_empty() {
                None
            } else {
                Some(fields.into_iter().map(str::to_string).collect())
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupTransform {
    pub lookup: String,
    pub from: LookupData,
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Names>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

// =============================================================================
// TimeUnit
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeUnitTransform {
    #[serde(rename = "timeUnit")]
    pub time_unit: TimeUnit,
    pub field: String,
    #[serde(rename = "as")]
    pub as_: String,
}
