//! Rule-based validation of compiled Vega-Lite documents.
//!
//! The checks encode the parts of the Vega-Lite v2 schema that user code can
//! get wrong through this crate or through hand-written JSON passed to the
//! CLI. The first violation wins and is reported with a JSON path such as
//! `$.layer[1].encoding.x.type`.

use super::mark::{Mark, MARK_PROPERTIES};
use super::data::FormatType;
use super::resolve::{ResolveKind, ResolveMode};
use super::types::{Aggregate, Channel, FieldType, TimeUnit};
use crate::selection::SelectionType;
use crate::{ChartError, Result};
use serde_json::{Map, Value};
use std::str::FromStr;

// ============================================================================
// Allowed key sets
// ============================================================================

const VIEW_KINDS: &[&str] = &["mark", "layer", "hconcat", "vconcat", "facet"];

const COMMON_VIEW_KEYS: &[&str] = &[
    "data",
    "transform",
    "width",
    "height",
    "title",
    "description",
    "name",
];

const TOP_LEVEL_KEYS: &[&str] = &["$schema", "config", "background", "padding", "autosize"];

const UNIT_KEYS: &[&str] = &["mark", "encoding", "selection", "projection"];

const ENCODING_PROPERTIES: &[&str] = &[
    "field",
    "type",
    "aggregate",
    "bin",
    "timeUnit",
    "title",
    "value",
    "condition",
    "sort",
    "scale",
    "axis",
    "legend",
    "format",
    "stack",
    "header",
];

const CONDITION_PROPERTIES: &[&str] = &[
    "selection",
    "test",
    "field",
    "type",
    "aggregate",
    "bin",
    "timeUnit",
    "title",
    "value",
    "scale",
    "legend",
    "format",
];

const SELECTION_PROPERTIES: &[&str] = &[
    "type",
    "encodings",
    "fields",
    "on",
    "empty",
    "bind",
    "resolve",
    "nearest",
    "toggle",
    "translate",
    "zoom",
    "mark",
    "clear",
];

/// (discriminator, allowed keys, required keys) per transform kind
const TRANSFORM_RULES: &[(&str, &[&str], &[&str])] = &[
    ("aggregate", &["aggregate", "groupby"], &["aggregate"]),
    ("bin", &["bin", "field", "as"], &["bin", "field", "as"]),
    ("calculate", &["calculate", "as"], &["calculate", "as"]),
    ("filter", &["filter"], &["filter"]),
    ("lookup", &["lookup", "from", "as", "default"], &["lookup", "from"]),
    ("timeUnit", &["timeUnit", "field", "as"], &["timeUnit", "field", "as"]),
];

// ============================================================================
// Entry point
// ============================================================================

/// Validate a top-level compiled document
pub fn validate(doc: &Value) -> Result<()> {
    let obj = as_object(doc, "$")?;
    match obj.get("$schema") {
        Some(Value::String(_)) => {}
        Some(_) => return Err(violation("$.$schema", "'$schema' must be a string")),
        None => return Err(violation("$", "top-level document is missing '$schema'")),
    }
    validate_view(obj, "$", ViewContext::TopLevel)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewContext {
    TopLevel,
    Concat,
    Layer,
    Facet,
}

fn validate_view(obj: &Map<String, Value>, path: &str, context: ViewContext) -> Result<()> {
    let kinds: Vec<&str> = VIEW_KINDS
        .iter()
        .copied()
        .filter(|k| obj.contains_key(*k))
        .collect();
    let kind = match kinds.as_slice() {
        [kind] => *kind,
        [] => {
            return Err(violation(
                path,
                "view must contain one of 'mark', 'layer', 'hconcat', 'vconcat' or 'facet'",
            ))
        }
        many => {
            return Err(violation(
                path,
                format!("view is ambiguous, found: {}", many.join(", ")),
            ))
        }
    };

    if matches!(context, ViewContext::Layer | ViewContext::Facet)
        && !matches!(kind, "mark" | "layer")
    {
        return Err(violation(
            path,
            format!("'{}' views cannot be nested in a layer or facet", kind),
        ));
    }

    let mut allowed: Vec<&str> = COMMON_VIEW_KEYS.to_vec();
    if context == ViewContext::TopLevel {
        allowed.extend_from_slice(TOP_LEVEL_KEYS);
    }
    match kind {
        "mark" => allowed.extend_from_slice(UNIT_KEYS),
        "facet" => allowed.extend_from_slice(&["facet", "spec", "resolve"]),
        other => allowed.extend_from_slice(&[other, "resolve"]),
    }
    check_keys(obj, path, &allowed)?;

    if let Some(data) = obj.get("data") {
        validate_data(data, &join(path, "data"))?;
    }
    if let Some(transform) = obj.get("transform") {
        validate_transforms(transform, &join(path, "transform"))?;
    }
    if let Some(resolve) = obj.get("resolve") {
        validate_resolve(resolve, &join(path, "resolve"))?;
    }

    match kind {
        "mark" => {
            validate_mark(&obj["mark"], &join(path, "mark"))?;
            if let Some(encoding) = obj.get("encoding") {
                validate_encoding(encoding, &join(path, "encoding"))?;
            }
            if let Some(selection) = obj.get("selection") {
                validate_selection(selection, &join(path, "selection"))?;
            }
        }
        "facet" => {
            let facet_path = join(path, "facet");
            let facet = as_object(&obj["facet"], &facet_path)?;
            check_keys(facet, &facet_path, &["row", "column"])?;
            if facet.is_empty() {
                return Err(violation(&facet_path, "facet requires 'row' or 'column'"));
            }
            for (key, def) in facet {
                let channel = if key == "row" {
                    Channel::Row
                } else {
                    Channel::Column
                };
                validate_channel_def(channel, def, &join(&facet_path, key))?;
            }
            let spec_path = join(path, "spec");
            let spec = obj
                .get("spec")
                .ok_or_else(|| violation(path, "facet view requires 'spec'"))?;
            validate_view(as_object(spec, &spec_path)?, &spec_path, ViewContext::Facet)?;
        }
        children_key => {
            let list_path = join(path, children_key);
            let children = as_array(&obj[children_key], &list_path)?;
            let child_context = if children_key == "layer" {
                ViewContext::Layer
            } else {
                ViewContext::Concat
            };
            for (i, child) in children.iter().enumerate() {
                let child_path = format!("{}[{}]", list_path, i);
                validate_view(as_object(child, &child_path)?, &child_path, child_context)?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Data / mark
// ============================================================================

fn validate_data(value: &Value, path: &str) -> Result<()> {
    let obj = as_object(value, path)?;
    check_keys(obj, path, &["values", "url", "name", "format"])?;
    let sources: Vec<&str> = ["values", "url", "name"]
        .into_iter()
        .filter(|k| obj.contains_key(*k))
        .collect();
    if sources.len() != 1 {
        return Err(violation(
            path,
            "data must contain exactly one of 'values', 'url' or 'name'",
        ));
    }
    match sources[0] {
        "values" => {
            as_array(&obj["values"], &join(path, "values"))?;
        }
        key => {
            as_str(&obj[key], &join(path, key))?;
        }
    }
    if let Some(format) = obj.get("format") {
        let format_path = join(path, "format");
        let format = as_object(format, &format_path)?;
        check_keys(format, &format_path, &["type", "parse", "property", "feature", "mesh"])?;
        if let Some(t) = format.get("type") {
            parse_at::<FormatType>(t, &join(&format_path, "type"))?;
        }
    }
    Ok(())
}

fn validate_mark(value: &Value, path: &str) -> Result<()> {
    match value {
        Value::String(_) => parse_at::<Mark>(value, path).map(|_| ()),
        Value::Object(obj) => {
            check_keys(obj, path, MARK_PROPERTIES)?;
            let t = obj
                .get("type")
                .ok_or_else(|| violation(path, "mark definition requires 'type'"))?;
            parse_at::<Mark>(t, &join(path, "type")).map(|_| ())
        }
        _ => Err(violation(path, "mark must be a string or an object")),
    }
}

// ============================================================================
// Encoding
// ============================================================================

fn validate_encoding(value: &Value, path: &str) -> Result<()> {
    let obj = as_object(value, path)?;
    for (key, def) in obj {
        let channel_path = join(path, key);
        let channel = Channel::from_str(key).map_err(|e| relocate(e, &channel_path))?;
        match def {
            Value::Array(defs) if matches!(channel, Channel::Detail | Channel::Tooltip) => {
                for (i, d) in defs.iter().enumerate() {
                    validate_channel_def(channel, d, &format!("{}[{}]", channel_path, i))?;
                }
            }
            _ => validate_channel_def(channel, def, &channel_path)?,
        }
    }
    Ok(())
}

fn validate_channel_def(channel: Channel, value: &Value, path: &str) -> Result<()> {
    let obj = as_object(value, path)?;
    check_keys(obj, path, ENCODING_PROPERTIES)?;
    if !["field", "aggregate", "value", "condition"]
        .iter()
        .any(|k| obj.contains_key(*k))
    {
        return Err(violation(
            path,
            "channel definition requires a 'field', 'aggregate', 'value' or 'condition'",
        ));
    }
    validate_field_properties(obj, path)?;

    if let Some(condition) = obj.get("condition") {
        let condition_path = join(path, "condition");
        if channel.is_position() {
            return Err(violation(
                &condition_path,
                format!("'{}' channel does not support conditional definitions", channel),
            ));
        }
        match condition {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_condition(item, &format!("{}[{}]", condition_path, i))?;
                }
            }
            item => validate_condition(item, &condition_path)?,
        }
    }
    Ok(())
}

fn validate_condition(value: &Value, path: &str) -> Result<()> {
    let obj = as_object(value, path)?;
    check_keys(obj, path, CONDITION_PROPERTIES)?;
    if obj.contains_key("selection") == obj.contains_key("test") {
        return Err(violation(
            path,
            "condition requires exactly one of 'selection' or 'test'",
        ));
    }
    if !["field", "aggregate", "value"]
        .iter()
        .any(|k| obj.contains_key(*k))
    {
        return Err(violation(path, "condition requires a 'field' or 'value'"));
    }
    validate_field_properties(obj, path)
}

/// Checks shared by channel and condition definitions
fn validate_field_properties(obj: &Map<String, Value>, path: &str) -> Result<()> {
    if obj.contains_key("field") && obj.contains_key("value") {
        return Err(violation(
            path,
            "definition cannot carry both 'field' and 'value'",
        ));
    }
    if let Some(field) = obj.get("field") {
        as_str(field, &join(path, "field"))?;
    }
    if obj.contains_key("field") || obj.contains_key("aggregate") {
        let t = obj
            .get("type")
            .ok_or_else(|| violation(&join(path, "type"), "field definition requires 'type'"))?;
        parse_at::<FieldType>(t, &join(path, "type"))?;
    }
    if let Some(aggregate) = obj.get("aggregate") {
        parse_at::<Aggregate>(aggregate, &join(path, "aggregate"))?;
    }
    if let Some(time_unit) = obj.get("timeUnit") {
        parse_at::<TimeUnit>(time_unit, &join(path, "timeUnit"))?;
    }
    if let Some(bin) = obj.get("bin") {
        if !(bin.is_boolean() || bin.is_object()) {
            return Err(violation(
                &join(path, "bin"),
                "bin must be a boolean or an object",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Transforms
// ============================================================================

fn validate_transforms(value: &Value, path: &str) -> Result<()> {
    let items = as_array(value, path)?;
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path, i);
        let obj = as_object(item, &item_path)?;
        let matched: Vec<_> = TRANSFORM_RULES
            .iter()
            .filter(|(key, _, _)| obj.contains_key(*key))
            .collect();
        let (kind, allowed, required) = match matched.as_slice() {
            [rule] => **rule,
            [] => {
                return Err(violation(
                    &item_path,
                    format!(
                        "unknown transform, expected one of: {}",
                        TRANSFORM_RULES
                            .iter()
                            .map(|(k, _, _)| *k)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ))
            }
            _ => {
                return Err(violation(
                    &item_path,
                    "transform matches more than one transform kind",
                ))
            }
        };
        check_keys(obj, &item_path, allowed)?;
        for key in required {
            if !obj.contains_key(*key) {
                return Err(violation(
                    &item_path,
                    format!("{} transform requires '{}'", kind, key),
                ));
            }
        }
        match kind {
            "aggregate" => {
                let ops_path = join(&item_path, "aggregate");
                for (j, op) in as_array(&obj["aggregate"], &ops_path)?.iter().enumerate() {
                    let op_path = format!("{}[{}]", ops_path, j);
                    let op_obj = as_object(op, &op_path)?;
                    check_keys(op_obj, &op_path, &["op", "field", "as"])?;
                    let op_value = op_obj
                        .get("op")
                        .ok_or_else(|| violation(&op_path, "aggregated field requires 'op'"))?;
                    parse_at::<Aggregate>(op_value, &join(&op_path, "op"))?;
                }
            }
            "timeUnit" => {
                parse_at::<TimeUnit>(&obj["timeUnit"], &join(&item_path, "timeUnit"))?;
            }
            "lookup" => {
                let from_path = join(&item_path, "from");
                let from = as_object(&obj["from"], &from_path)?;
                check_keys(from, &from_path, &["data", "key", "fields"])?;
                match from.get("data") {
                    Some(data) => validate_data(data, &join(&from_path, "data"))?,
                    None => return Err(violation(&from_path, "lookup source requires 'data'")),
                }
                if !from.contains_key("key") {
                    return Err(violation(&from_path, "lookup source requires 'key'"));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// Resolve / selection
// ============================================================================

fn validate_resolve(value: &Value, path: &str) -> Result<()> {
    let obj = as_object(value, path)?;
    check_keys(obj, path, &["axis", "legend", "scale"])?;
    for (key, map) in obj {
        let kind = match key.as_str() {
            "axis" => ResolveKind::Axis,
            "legend" => ResolveKind::Legend,
            _ => ResolveKind::Scale,
        };
        let map_path = join(path, key);
        for (channel, mode) in as_object(map, &map_path)? {
            let entry_path = join(&map_path, channel);
            let channel = Channel::from_str(channel).map_err(|e| relocate(e, &entry_path))?;
            if !kind.channels().contains(&channel) {
                return Err(violation(
                    &entry_path,
                    format!("'{}' cannot be resolved for {}", channel, key),
                ));
            }
            parse_at::<ResolveMode>(mode, &entry_path)?;
        }
    }
    Ok(())
}

fn validate_selection(value: &Value, path: &str) -> Result<()> {
    let obj = as_object(value, path)?;
    for (name, def) in obj {
        let def_path = join(path, name);
        let def = as_object(def, &def_path)?;
        check_keys(def, &def_path, SELECTION_PROPERTIES)?;
        let t = def
            .get("type")
            .ok_or_else(|| violation(&def_path, "selection requires 'type'"))?;
        parse_at::<SelectionType>(t, &join(&def_path, "type"))?;
        if let Some(empty) = def.get("empty") {
            match empty.as_str() {
                Some("all") | Some("none") => {}
                _ => {
                    return Err(violation(
                        &join(&def_path, "empty"),
                        "'empty' must be \"all\" or \"none\"",
                    ))
                }
            }
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn violation(path: &str, message: impl Into<String>) -> ChartError {
    ChartError::SchemaError {
        path: path.to_string(),
        message: message.into(),
    }
}

/// Re-point a value-parse error at the document path being validated
fn relocate(err: ChartError, path: &str) -> ChartError {
    match err {
        ChartError::SchemaError { message, .. } => violation(path, message),
        other => other,
    }
}

fn join(path: &str, key: &str) -> String {
    format!("{}.{}", path, key)
}

fn parse_at<T: FromStr<Err = ChartError>>(value: &Value, path: &str) -> Result<T> {
    T::from_str(as_str(value, path)?).map_err(|e| relocate(e, path))
}

fn check_keys(obj: &Map<String, Value>, path: &str, allowed: &[&str]) -> Result<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(violation(
            &join(path, key),
            format!(
                "additional property '{}' is not allowed. Allowed properties: {}",
                key,
                allowed.join(", ")
            ),
        )),
        None => Ok(()),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| violation(path, format!("expected an object, got {}", value)))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| violation(path, format!("expected an array, got {}", value)))
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| violation(path, format!("expected a string, got {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v2.json";

    fn error_path(doc: Value) -> String {
        match validate(&doc) {
            Err(ChartError::SchemaError { path, .. }) => path,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_unit_document() {
        let doc = json!({
            "$schema": SCHEMA,
            "data": {"values": [{"x": 1, "y": 2}]},
            "mark": "point",
            "encoding": {
                "x": {"field": "x", "type": "quantitative"},
                "y": {"field": "y", "type": "quantitative", "aggregate": "mean"},
                "color": {
                    "condition": {"selection": "brush", "field": "c", "type": "nominal"},
                    "value": "lightgray"
                }
            },
            "transform": [{"filter": "datum.x < 4"}, {"calculate": "datum.x * 2", "as": "x2"}],
            "selection": {"brush": {"type": "interval"}}
        });
        validate(&doc).unwrap();
    }

    #[test]
    fn test_missing_schema_key() {
        assert_eq!(error_path(json!({"mark": "point"})), "$");
    }

    #[test]
    fn test_missing_type_reported_at_path() {
        let doc = json!({
            "$schema": SCHEMA,
            "mark": "point",
            "encoding": {"x": {"field": "x"}}
        });
        assert_eq!(error_path(doc), "$.encoding.x.type");
    }

    #[test]
    fn test_invalid_mark_lists_allowed_values() {
        let doc = json!({"$schema": SCHEMA, "mark": "pointy"});
        match validate(&doc) {
            Err(ChartError::SchemaError { path, message }) => {
                assert_eq!(path, "$.mark");
                assert!(message.contains("'pointy'"));
                assert!(message.contains("point"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_top_level_key() {
        let doc = json!({"$schema": SCHEMA, "mark": "point", "colour": "red"});
        assert_eq!(error_path(doc), "$.colour");
    }

    #[test]
    fn test_position_condition_rejected() {
        let doc = json!({
            "$schema": SCHEMA,
            "mark": "point",
            "encoding": {"x": {
                "condition": {"selection": "s", "value": 1},
                "value": 0
            }}
        });
        assert_eq!(error_path(doc), "$.encoding.x.condition");
    }

    #[test]
    fn test_layer_child_paths() {
        let doc = json!({
            "$schema": SCHEMA,
            "layer": [
                {"mark": "line"},
                {"mark": "point", "encoding": {"y": {"field": "y", "type": "quant"}}}
            ]
        });
        assert_eq!(error_path(doc), "$.layer[1].encoding.y.type");
    }

    #[test]
    fn test_concat_inside_layer_rejected() {
        let doc = json!({
            "$schema": SCHEMA,
            "layer": [{"hconcat": [{"mark": "point"}]}]
        });
        assert_eq!(error_path(doc), "$.layer[0]");
    }

    #[test]
    fn test_data_must_be_exclusive() {
        let doc = json!({
            "$schema": SCHEMA,
            "data": {"url": "a.csv", "values": []},
            "mark": "point"
        });
        assert_eq!(error_path(doc), "$.data");
    }

    #[test]
    fn test_transform_rules() {
        let doc = json!({
            "$schema": SCHEMA,
            "mark": "point",
            "transform": [{"bin": true, "field": "x"}]
        });
        assert_eq!(error_path(doc), "$.transform[0]");

        let doc = json!({
            "$schema": SCHEMA,
            "mark": "point",
            "transform": [{"timeUnit": "decade", "field": "x", "as": "y"}]
        });
        assert_eq!(error_path(doc), "$.transform[0].timeUnit");
    }

    #[test]
    fn test_facet_requires_spec() {
        let doc = json!({
            "$schema": SCHEMA,
            "facet": {"row": {"field": "a", "type": "nominal"}}
        });
        assert_eq!(error_path(doc), "$");

        let doc = json!({
            "$schema": SCHEMA,
            "data": {"url": "a.csv"},
            "facet": {"row": {"field": "a", "type": "nominal"}},
            "spec": {"mark": "point"}
        });
        validate(&doc).unwrap();
    }

    #[test]
    fn test_resolve_values() {
        let doc = json!({
            "$schema": SCHEMA,
            "hconcat": [{"mark": "point"}, {"mark": "line"}],
            "resolve": {"scale": {"y": "separate"}}
        });
        assert_eq!(error_path(doc), "$.resolve.scale.y");
    }

    #[test]
    fn test_selection_type_checked() {
        let doc = json!({
            "$schema": SCHEMA,
            "mark": "point",
            "selection": {"s": {"type": "brush"}}
        });
        assert_eq!(error_path(doc), "$.selection.s.type");
    }
}
