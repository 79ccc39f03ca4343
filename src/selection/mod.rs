//! Interactive selections and their boolean algebra
//!
//! A [`Selection`] is a named predicate over the data a user interacts with.
//! Selections attach to unit charts through a [`SelectionMapping`] keyed by
//! name, and are referenced by name from filters and conditional encodings
//! through a [`SelectionExpr`]:
//!
//! ```
//! use vlchart::selection::{selection_interval, selection_single};
//!
//! let brush = selection_interval().with_name("brush");
//! let click = selection_single().with_name("click");
//!
//! let expr = &brush & &click;
//! assert_eq!(expr.to_value(), serde_json::json!({"and": ["brush", "click"]}));
//!
//! let both = (brush + click).unwrap();
//! assert_eq!(both.names(), vec!["brush", "click"]);
//! ```

use crate::encoding::{Branch, ChannelDef, ConditionDef, ConditionTest};
use crate::schema::Channel;
use crate::{naming, ChartError, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::ops::{Add, BitAnd, BitOr, Index, Not};

schema_enum! {
    /// Kind of interaction a selection captures
    pub enum SelectionType: "selection type" {
        Interval => "interval",
        Single => "single",
        Multi => "multi",
    }
}

schema_enum! {
    /// What an empty selection matches
    pub enum EmptyMode: "selection empty mode" {
        All => "all",
        None => "none",
    }
}

schema_enum! {
    /// How a selection resolves across views of a composite chart
    pub enum SelectionResolve: "selection resolve" {
        Global => "global",
        Union => "union",
        Intersect => "intersect",
    }
}

// ============================================================================
// Selection definition
// ============================================================================

/// Parameters of a selection, serialized under its name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionDef {
    #[serde(rename = "type")]
    pub selection_type: SelectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encodings: Option<Vec<Channel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<SelectionResolve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest: Option<bool>,
}

impl SelectionDef {
    pub fn new(selection_type: SelectionType) -> Self {
        Self {
            selection_type,
            encodings: None,
            fields: None,
            on: None,
            empty: None,
            bind: None,
            resolve: None,
            nearest: None,
        }
    }

    pub fn to_value(&self) -> Value {
        // Only enum strings, plain strings and user JSON
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "type": self.selection_type }))
    }
}

/// A named selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    name: String,
    def: SelectionDef,
}

/// Create a selection of the given type with a generated name
pub fn selection(selection_type: SelectionType) -> Selection {
    Selection::new(selection_type)
}

/// Create an interval (brush) selection
pub fn selection_interval() -> Selection {
    Selection::new(SelectionType::Interval)
}

/// Create a single-datum selection
pub fn selection_single() -> Selection {
    Selection::new(SelectionType::Single)
}

/// Create a multi-datum selection
pub fn selection_multi() -> Selection {
    Selection::new(SelectionType::Multi)
}

impl Selection {
    /// Create a selection named `selectorNNN`
    pub fn new(selection_type: SelectionType) -> Self {
        Self {
            name: naming::selection_name(),
            def: SelectionDef::new(selection_type),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn def(&self) -> &SelectionDef {
        &self.def
    }

    pub fn selection_type(&self) -> SelectionType {
        self.def.selection_type
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restrict the selection to the given encoding channels
    pub fn encodings(mut self, channels: impl IntoIterator<Item = Channel>) -> Self {
        self.def.encodings = Some(channels.into_iter().collect());
        self
    }

    /// Restrict the selection to the given data fields
    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.def.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Event stream that triggers the selection, e.g. `"mouseover"`
    pub fn on(mut self, events: impl Into<String>) -> Self {
        self.def.on = Some(events.into());
        self
    }

    pub fn empty(mut self, empty: EmptyMode) -> Self {
        self.def.empty = Some(empty);
        self
    }

    /// Bind the selection to an input element or to `"scales"`
    pub fn bind(mut self, bind: impl Into<Value>) -> Self {
        self.def.bind = Some(bind.into());
        self
    }

    pub fn resolve(mut self, resolve: SelectionResolve) -> Self {
        self.def.resolve = Some(resolve);
        self
    }

    pub fn nearest(mut self, nearest: bool) -> Self {
        self.def.nearest = Some(nearest);
        self
    }

    /// The definition when `name` is this selection's name
    pub fn get(&self, name: &str) -> Option<&SelectionDef> {
        (name == self.name).then_some(&self.def)
    }

    /// Single-entry mapping `{name: definition}`
    pub fn to_mapping(&self) -> SelectionMapping {
        SelectionMapping::from(self)
    }

    pub fn to_value(&self) -> Value {
        self.to_mapping().to_value()
    }

    /// Expression referencing this selection by name
    pub fn expr(&self) -> SelectionExpr {
        SelectionExpr::Name(self.name.clone())
    }

    pub fn and(&self, other: impl Into<SelectionExpr>) -> SelectionExpr {
        self.expr().and(other)
    }

    pub fn or(&self, other: impl Into<SelectionExpr>) -> SelectionExpr {
        self.expr().or(other)
    }

    pub fn not(&self) -> SelectionExpr {
        !self.expr()
    }
}

// ============================================================================
// Selection mapping
// ============================================================================

/// Selections keyed by name, as emitted under a unit chart's `selection` key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionMapping(BTreeMap<String, SelectionDef>);

impl SelectionMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine two mappings; a name present in both is a usage error
    pub fn merge(mut self, other: impl Into<SelectionMapping>) -> Result<Self> {
        self.extend(other)?;
        Ok(self)
    }

    /// Add the selections of `other` in place; a repeated name is a usage error
    pub fn extend(&mut self, other: impl Into<SelectionMapping>) -> Result<()> {
        let other = other.into();
        if let Some(name) = other.0.keys().find(|name| self.0.contains_key(*name)) {
            return Err(ChartError::UsageError(format!(
                "Selection '{}' is defined more than once",
                name
            )));
        }
        self.0.extend(other.0);
        Ok(())
    }

    /// Insert without the duplicate check, for selections with generated names
    pub(crate) fn insert(&mut self, selection: Selection) {
        self.0.insert(selection.name, selection.def);
    }

    pub fn get(&self, name: &str) -> Option<&SelectionDef> {
        self.0.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SelectionDef)> {
        self.0.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, def)| (name.clone(), def.to_value()))
                .collect::<Map<_, _>>(),
        )
    }
}

impl From<Selection> for SelectionMapping {
    fn from(selection: Selection) -> Self {
        SelectionMapping(BTreeMap::from([(selection.name, selection.def)]))
    }
}

impl From<&Selection> for SelectionMapping {
    fn from(selection: &Selection) -> Self {
        SelectionMapping::from(selection.clone())
    }
}

impl Index<&str> for SelectionMapping {
    type Output = SelectionDef;

    fn index(&self, name: &str) -> &SelectionDef {
        &self.0[name]
    }
}

impl Add for Selection {
    type Output = Result<SelectionMapping>;

    fn add(self, other: Selection) -> Self::Output {
        SelectionMapping::from(self).merge(other)
    }
}

impl Add<Selection> for SelectionMapping {
    type Output = Result<SelectionMapping>;

    fn add(self, other: Selection) -> Self::Output {
        self.merge(other)
    }
}

impl Add for SelectionMapping {
    type Output = Result<SelectionMapping>;

    fn add(self, other: SelectionMapping) -> Self::Output {
        self.merge(other)
    }
}

// ============================================================================
// Selection expressions
// ============================================================================

/// Boolean combination of selections, referencing them by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionExpr {
    Name(String),
    And(Vec<SelectionExpr>),
    Or(Vec<SelectionExpr>),
    Not(Box<SelectionExpr>),
}

impl SelectionExpr {
    pub fn and(self, other: impl Into<SelectionExpr>) -> SelectionExpr {
        match (self, other.into()) {
            (SelectionExpr::And(mut lhs), SelectionExpr::And(rhs)) => {
                lhs.extend(rhs);
                SelectionExpr::And(lhs)
            }
            (SelectionExpr::And(mut lhs), rhs) => {
                lhs.push(rhs);
                SelectionExpr::And(lhs)
            }
            (lhs, rhs) => SelectionExpr::And(vec![lhs, rhs]),
        }
    }

    pub fn or(self, other: impl Into<SelectionExpr>) -> SelectionExpr {
        match (self, other.into()) {
            (SelectionExpr::Or(mut lhs), SelectionExpr::Or(rhs)) => {
                lhs.extend(rhs);
                SelectionExpr::Or(lhs)
            }
            (SelectionExpr::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                SelectionExpr::Or(lhs)
            }
            (lhs, rhs) => SelectionExpr::Or(vec![lhs, rhs]),
        }
    }

    /// Names of every selection the expression references
    pub fn names(&self) -> Vec<&str> {
        match self {
            SelectionExpr::Name(name) => vec![name.as_str()],
            SelectionExpr::And(items) | SelectionExpr::Or(items) => {
                items.iter().flat_map(SelectionExpr::names).collect()
            }
            SelectionExpr::Not(inner) => inner.names(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SelectionExpr::Name(name) => json!(name),
            SelectionExpr::And(items) => {
                json!({ "and": items.iter().map(Self::to_value).collect::<Vec<_>>() })
            }
            SelectionExpr::Or(items) => {
                json!({ "or": items.iter().map(Self::to_value).collect::<Vec<_>>() })
            }
            SelectionExpr::Not(inner) => json!({ "not": inner.to_value() }),
        }
    }
}

impl Serialize for SelectionExpr {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<&Selection> for SelectionExpr {
    fn from(selection: &Selection) -> Self {
        selection.expr()
    }
}

impl From<Selection> for SelectionExpr {
    fn from(selection: Selection) -> Self {
        SelectionExpr::Name(selection.name)
    }
}

impl From<&str> for SelectionExpr {
    fn from(name: &str) -> Self {
        SelectionExpr::Name(name.to_string())
    }
}

impl<T: Into<SelectionExpr>> BitAnd<T> for SelectionExpr {
    type Output = SelectionExpr;

    fn bitand(self, other: T) -> SelectionExpr {
        self.and(other)
    }
}

impl<T: Into<SelectionExpr>> BitOr<T> for SelectionExpr {
    type Output = SelectionExpr;

    fn bitor(self, other: T) -> SelectionExpr {
        self.or(other)
    }
}

impl Not for SelectionExpr {
    type Output = SelectionExpr;

    fn not(self) -> SelectionExpr {
        match self {
            SelectionExpr::Not(inner) => *inner,
            other => SelectionExpr::Not(Box::new(other)),
        }
    }
}

impl<T: Into<SelectionExpr>> BitAnd<T> for &Selection {
    type Output = SelectionExpr;

    fn bitand(self, other: T) -> SelectionExpr {
        self.and(other)
    }
}

impl<T: Into<SelectionExpr>> BitOr<T> for &Selection {
    type Output = SelectionExpr;

    fn bitor(self, other: T) -> SelectionExpr {
        self.or(other)
    }
}

impl Not for &Selection {
    type Output = SelectionExpr;

    fn not(self) -> SelectionExpr {
        Selection::not(self)
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Build a conditional channel definition.
///
/// Shorthand strings in either branch are field definitions; use
/// [`Branch::value`] or a JSON value for constants. At most one branch may be a
/// field definition.
pub fn condition(
    predicate: impl Into<ConditionTest>,
    if_true: impl Into<Branch>,
    if_false: impl Into<Branch>,
) -> Result<ChannelDef> {
    let if_true = if_true.into();
    let if_false = if_false.into();
    if if_true.is_field() && if_false.is_field() {
        return Err(ChartError::UsageError(
            "A condition cannot have a field definition in both branches".to_string(),
        ));
    }
    Ok(ChannelDef::Condition(Box::new(ConditionDef {
        test: predicate.into(),
        if_true,
        if_false,
    })))
}
