//! Channel definitions and the encoding map
//!
//! A channel maps to one of:
//! - a field definition (`{"field": "x", "type": "quantitative"}`)
//! - a constant value (`{"value": "red"}`)
//! - a conditional definition (`{"condition": {...}, "value": ...}`)
//! - a list of field definitions (only meaningful for `detail`/`tooltip`)
//!
//! Field types are resolved when the encoding is compiled against the data
//! that is in scope, see [`Encoding::resolve`].

use super::infer::{available_fields, infer_field_type};
use super::shorthand::parse_shorthand;
use crate::schema::{Aggregate, Bin, Channel, Data, FieldType, TimeUnit};
use crate::selection::{Selection, SelectionExpr};
use crate::{ChartError, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// FieldDef
// =============================================================================

/// A field definition on an encoding channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDef {
    pub field: Option<String>,
    pub field_type: Option<FieldType>,
    pub aggregate: Option<Aggregate>,
    pub bin: Option<Bin>,
    pub time_unit: Option<TimeUnit>,
    pub title: Option<String>,
    /// Pass-through properties (`scale`, `axis`, `legend`, `sort`, ...)
    pub properties: Map<String, Value>,
}

impl FieldDef {
    /// Build a field definition from a shorthand string (`"mean(price):Q"`)
    pub fn new(shorthand: &str) -> Self {
        let parsed = parse_shorthand(shorthand);
        Self {
            field: parsed.field,
            field_type: parsed.field_type,
            aggregate: parsed.aggregate,
            ..Self::default()
        }
    }

    /// Build a field definition for a literal field name, without shorthand parsing
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            ..Self::default()
        }
    }

    /// The `count()` aggregate
    pub fn count() -> Self {
        Self {
            aggregate: Some(Aggregate::Count),
            field_type: Some(FieldType::Quantitative),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn with_bin(mut self, bin: impl Into<Bin>) -> Self {
        self.bin = Some(bin.into());
        self
    }

    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = Some(time_unit);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a pass-through property such as `scale` or `axis`
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Serialize as given, without type resolution
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map(self.field_type))
    }

    /// Serialize with a resolved `type`.
    ///
    /// Explicit types win; counting aggregates are quantitative; otherwise the
    /// type is inferred from `data`. A field whose type cannot be determined
    /// is a usage error naming the channel and the field.
    pub fn resolve(&self, channel: Channel, data: Option<&Data>) -> Result<Value> {
        let field_type = self.resolve_type(channel, data)?;
        Ok(Value::Object(self.to_map(Some(field_type))))
    }

    fn resolve_type(&self, channel: Channel, data: Option<&Data>) -> Result<FieldType> {
        if let Some(t) = self.field_type {
            return Ok(t);
        }
        if self.aggregate.map(|a| a.is_counting()).unwrap_or(false) {
            return Ok(FieldType::Quantitative);
        }
        let field = self.field.as_deref().unwrap_or("");
        if let Some(t) = data.and_then(|d| infer_field_type(d, field)) {
            tracing::debug!("Inferred type '{}' for field '{}' on {}", t, field, channel);
            return Ok(t);
        }
        if self.time_unit.is_some() {
            return Ok(FieldType::Temporal);
        }

        let reason = match data {
            None => "no data is attached to the chart".to_string(),
            Some(d) if d.is_external() => "the attached data is not available locally".to_string(),
            Some(d) => format!(
                "the field is not in the data (available: {})",
                available_fields(d).join(", ")
            ),
        };
        Err(ChartError::UsageError(format!(
            "Unable to determine the type of field '{}' on channel '{}': {}. \
             Specify it explicitly, e.g. \"{}:Q\"",
            field, channel, reason, field
        )))
    }

    fn to_map(&self, field_type: Option<FieldType>) -> Map<String, Value> {
        let mut obj = self.properties.clone();
        if let Some(field) = &self.field {
            obj.insert("field".to_string(), json!(field));
        }
        if let Some(t) = field_type {
            obj.insert("type".to_string(), json!(t.as_str()));
        }
        if let Some(aggregate) = self.aggregate {
            obj.insert("aggregate".to_string(), json!(aggregate.as_str()));
        }
        if let Some(bin) = &self.bin {
            obj.insert("bin".to_string(), bin.to_value());
        }
        if let Some(time_unit) = self.time_unit {
            obj.insert("timeUnit".to_string(), json!(time_unit.as_str()));
        }
        if let Some(title) = &self.title {
            obj.insert("title".to_string(), json!(title));
        }
        obj
    }
}

impl From<&str> for FieldDef {
    fn from(shorthand: &str) -> Self {
        FieldDef::new(shorthand)
    }
}

impl From<String> for FieldDef {
    fn from(shorthand: String) -> Self {
        FieldDef::new(&shorthand)
    }
}

// =============================================================================
// Conditions
// =============================================================================

/// What a condition tests
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTest {
    /// Membership in an interactive selection (or a combination of selections)
    Selection(SelectionExpr),
    /// A Vega expression evaluated per datum
    Test(String),
}

impl ConditionTest {
    pub fn selection(name: impl Into<String>) -> Self {
        ConditionTest::Selection(SelectionExpr::Name(name.into()))
    }

    pub fn test(expr: impl Into<String>) -> Self {
        ConditionTest::Test(expr.into())
    }
}

impl From<SelectionExpr> for ConditionTest {
    fn from(expr: SelectionExpr) -> Self {
        ConditionTest::Selection(expr)
    }
}

impl From<&Selection> for ConditionTest {
    fn from(selection: &Selection) -> Self {
        ConditionTest::Selection(selection.into())
    }
}

/// One side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    Field(FieldDef),
    Value(Value),
}

impl Branch {
    pub fn value(value: impl Into<Value>) -> Self {
        Branch::Value(value.into())
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Branch::Field(_))
    }

    fn to_map(&self, channel: Channel, data: Option<&Data>, resolve: bool) -> Result<Map<String, Value>> {
        match self {
            Branch::Field(def) => {
                let value = if resolve {
                    def.resolve(channel, data)?
                } else {
                    def.to_value()
                };
                Ok(value.as_object().cloned().unwrap_or_default())
            }
            Branch::Value(v) => {
                let mut obj = Map::new();
                obj.insert("value".to_string(), v.clone());
                Ok(obj)
            }
        }
    }
}

/// Shorthand strings are field definitions
impl From<&str> for Branch {
    fn from(shorthand: &str) -> Self {
        Branch::Field(FieldDef::new(shorthand))
    }
}

impl From<FieldDef> for Branch {
    fn from(def: FieldDef) -> Self {
        Branch::Field(def)
    }
}

impl From<Value> for Branch {
    fn from(value: Value) -> Self {
        Branch::Value(value)
    }
}

/// A conditional channel definition
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDef {
    pub test: ConditionTest,
    pub if_true: Branch,
    pub if_false: Branch,
}

impl ConditionDef {
    fn to_value(&self, channel: Channel, data: Option<&Data>, resolve: bool) -> Result<Value> {
        let mut condition = Map::new();
        match &self.test {
            ConditionTest::Selection(expr) => {
                condition.insert("selection".to_string(), expr.to_value());
            }
            ConditionTest::Test(expr) => {
                condition.insert("test".to_string(), json!(expr));
            }
        }
        condition.extend(self.if_true.to_map(channel, data, resolve)?);

        let mut obj = self.if_false.to_map(channel, data, resolve)?;
        obj.insert("condition".to_string(), Value::Object(condition));
        Ok(Value::Object(obj))
    }
}

// =============================================================================
// ChannelDef
// =============================================================================

/// Definition attached to one encoding channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelDef {
    Field(FieldDef),
    Value(Value),
    Condition(Box<ConditionDef>),
    Fields(Vec<FieldDef>),
}

impl ChannelDef {
    /// A constant value definition
    pub fn value(value: impl Into<Value>) -> Self {
        ChannelDef::Value(value.into())
    }

    /// Serialize as given, without type resolution
    pub fn to_value(&self, channel: Channel) -> Value {
        match self.compile(channel, None, false) {
            Ok(v) => v,
            // Unresolved serialization never fails
            Err(_) => Value::Null,
        }
    }

    /// Serialize with every field type resolved against `data`
    pub fn resolve(&self, channel: Channel, data: Option<&Data>) -> Result<Value> {
        self.compile(channel, data, true)
    }

    fn compile(&self, channel: Channel, data: Option<&Data>, resolve: bool) -> Result<Value> {
        match self {
            ChannelDef::Field(def) if resolve => def.resolve(channel, data),
            ChannelDef::Field(def) => Ok(def.to_value()),
            ChannelDef::Value(v) => Ok(json!({ "value": v })),
            ChannelDef::Condition(cond) => cond.to_value(channel, data, resolve),
            ChannelDef::Fields(defs) => defs
                .iter()
                .map(|def| {
                    if resolve {
                        def.resolve(channel, data)
                    } else {
                        Ok(def.to_value())
                    }
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }
}

impl From<&str> for ChannelDef {
    fn from(shorthand: &str) -> Self {
        ChannelDef::Field(FieldDef::new(shorthand))
    }
}

impl From<String> for ChannelDef {
    fn from(shorthand: String) -> Self {
        ChannelDef::Field(FieldDef::new(&shorthand))
    }
}

impl From<FieldDef> for ChannelDef {
    fn from(def: FieldDef) -> Self {
        ChannelDef::Field(def)
    }
}

impl From<Vec<FieldDef>> for ChannelDef {
    fn from(defs: Vec<FieldDef>) -> Self {
        ChannelDef::Fields(defs)
    }
}

impl From<ConditionDef> for ChannelDef {
    fn from(cond: ConditionDef) -> Self {
        ChannelDef::Condition(Box::new(cond))
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Channel → definition map of a unit chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding(BTreeMap<Channel, ChannelDef>);

/// A single channel assignment, usable with [`Encoding::with`]
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingChannel {
    pub channel: Channel,
    pub def: ChannelDef,
}

impl EncodingChannel {
    pub fn new(channel: Channel, def: impl Into<ChannelDef>) -> Self {
        Self {
            channel,
            def: def.into(),
        }
    }
}

impl Encoding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a definition to a channel, replacing any previous one
    pub fn channel(mut self, channel: Channel, def: impl Into<ChannelDef>) -> Self {
        self.0.insert(channel, def.into());
        self
    }

    /// Assign a prebuilt channel
    pub fn with(self, channel: EncodingChannel) -> Self {
        self.channel(channel.channel, channel.def)
    }

    /// Overlay `other` on top of this encoding
    pub fn merge(mut self, other: Encoding) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, channel: Channel) -> Option<&ChannelDef> {
        self.0.get(&channel)
    }

    pub fn remove(&mut self, channel: Channel) -> Option<ChannelDef> {
        self.0.remove(&channel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Channel, &ChannelDef)> {
        self.0.iter()
    }

    /// Serialize as given, without type resolution
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(channel, def)| (channel.to_string(), def.to_value(*channel)))
                .collect(),
        )
    }

    /// Serialize with every channel's field type resolved against `data`
    pub fn resolve(&self, data: Option<&Data>) -> Result<Value> {
        let mut obj = Map::new();
        for (channel, def) in &self.0 {
            obj.insert(channel.to_string(), def.resolve(*channel, data)?);
        }
        Ok(Value::Object(obj))
    }
}

impl FromIterator<EncodingChannel> for Encoding {
    fn from_iter<I: IntoIterator<Item = EncodingChannel>>(iter: I) -> Self {
        iter.into_iter().fold(Encoding::new(), Encoding::with)
    }
}

macro_rules! channel_setters {
    ($($method:ident => $channel:ident),+ $(,)?) => {
        impl Encoding {
            $(
                #[doc = concat!("Assign the `", stringify!($method), "` channel")]
                pub fn $method(self, def: impl Into<ChannelDef>) -> Self {
                    self.channel(Channel::$channel, def)
                }
            )+
        }

        impl EncodingChannel {
            $(
                #[doc = concat!("A `", stringify!($method), "` channel assignment")]
                pub fn $method(def: impl Into<ChannelDef>) -> Self {
                    Self::new(Channel::$channel, def)
                }
            )+
        }
    };
}

channel_setters! {
    x => X,
    y => Y,
    x2 => X2,
    y2 => Y2,
    color => Color,
    fill => Fill,
    stroke => Stroke,
    opacity => Opacity,
    shape => Shape,
    size => Size,
    text => Text,
    tooltip => Tooltip,
    detail => Detail,
    order => Order,
    href => Href,
    key => Key,
    row => Row,
    column => Column,
}
