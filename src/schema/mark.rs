//! Mark types
//!
//! A mark is the geometric primitive drawn for each data record. A bare mark
//! serializes as its name (`"point"`); a mark with properties serializes as
//! an object carrying a `type` key (`{"type": "point", "filled": true}`).

use serde_json::{Map, Value};

schema_enum! {
    /// Geometric primitive used to render each data record
    pub enum Mark: "mark" {
        Area => "area",
        Bar => "bar",
        Circle => "circle",
        Geoshape => "geoshape",
        Line => "line",
        Point => "point",
        Rect => "rect",
        Rule => "rule",
        Square => "square",
        Text => "text",
        Tick => "tick",
        Trail => "trail",
    }
}

/// Properties a mark definition may carry
pub const MARK_PROPERTIES: &[&str] = &[
    "type",
    "style",
    "clip",
    "color",
    "fill",
    "stroke",
    "opacity",
    "fillOpacity",
    "strokeOpacity",
    "strokeWidth",
    "strokeDash",
    "strokeDashOffset",
    "strokeCap",
    "filled",
    "orient",
    "interpolate",
    "tension",
    "size",
    "shape",
    "thickness",
    "binSpacing",
    "align",
    "baseline",
    "dx",
    "dy",
    "font",
    "fontSize",
    "fontStyle",
    "fontWeight",
    "text",
    "angle",
    "radius",
    "theta",
    "limit",
    "cursor",
    "href",
];

/// A mark together with optional mark properties
#[derive(Debug, Clone, PartialEq)]
pub struct MarkDef {
    /// The mark type
    pub mark: Mark,
    /// Additional properties (`filled`, `color`, `size`, ...)
    pub properties: Map<String, Value>,
}

impl MarkDef {
    /// Create a mark definition without properties
    pub fn new(mark: Mark) -> Self {
        Self {
            mark,
            properties: Map::new(),
        }
    }

    /// Set a mark property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Serialize to the schema form: a string when bare, an object otherwise
    pub fn to_value(&self) -> Value {
        if self.properties.is_empty() {
            return Value::String(self.mark.as_str().to_string());
        }
        let mut obj = self.properties.clone();
        obj.insert("type".to_string(), Value::String(self.mark.as_str().to_string()));
        Value::Object(obj)
    }
}

impl From<Mark> for MarkDef {
    fn from(mark: Mark) -> Self {
        Self::new(mark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_bare_mark_serializes_as_string() {
        assert_eq!(MarkDef::new(Mark::Point).to_value(), json!("point"));
        assert_eq!(MarkDef::new(Mark::Tick).to_value(), json!("tick"));
    }

    #[test]
    fn test_mark_with_properties_serializes_as_object() {
        let mark = MarkDef::new(Mark::Point)
            .with_property("filled", true)
            .with_property("size", 60);
        assert_eq!(
            mark.to_value(),
            json!({"type": "point", "filled": true, "size": 60})
        );
    }

    #[test]
    fn test_unknown_mark_is_rejected() {
        let err = Mark::from_str("pointy").unwrap_err();
        assert!(err.to_string().contains("area, bar, circle"));
    }
}
