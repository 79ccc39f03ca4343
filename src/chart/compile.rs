//! Compilation of chart values to Vega-Lite documents
//!
//! Every chart type implements [`ChartSpec::compile_view`], which produces the
//! JSON object of one view. The provided methods wrap the top-level view into
//! a document: `$schema` is added and the result is validated.
//!
//! Data flows down and up during compilation:
//! - children resolve field types against the nearest data in scope;
//! - child data identical to the parent's is dropped from the child;
//! - when the parent has none and every child carries identical data, that
//!   data moves to the parent;
//! - a facet's data always lives next to `facet`, never inside `spec`;
//! - document-only properties (`config`, `background`, ...) set on nested
//!   views move up to the enclosing view.

use super::composite::{HConcatChart, LayerChart, LayerChild, VConcatChart};
use super::facet::{FacetChart, FacetSpec};
use super::unit::Chart;
use super::{AnyChart, ViewProperties, TOP_LEVEL_ONLY};
use crate::display::MimeBundle;
use crate::schema::{self, Channel, Data, Resolve, Transform};
use crate::writer::Format;
use crate::{naming, ChartError, Result};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Options for compiling a top-level document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run schema validation on the compiled document
    pub validate: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl CompileOptions {
    pub fn without_validation() -> Self {
        Self { validate: false }
    }
}

/// What a view inherits from its ancestors while compiling
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileContext<'a> {
    /// Nearest ancestor data, used for type inference
    pub data: Option<&'a Data>,
}

/// A chart that compiles to a Vega-Lite document
pub trait ChartSpec {
    /// Compile this chart as a view nested in `ctx`
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>>;

    /// Compile to a top-level document
    fn to_value(&self, options: &CompileOptions) -> Result<Value> {
        let mut view = self.compile_view(&CompileContext::default())?;
        view.insert("$schema".to_string(), json!(naming::VEGALITE_SCHEMA_URL));
        let doc = Value::Object(view);
        if options.validate {
            schema::validate(&doc)?;
        } else {
            tracing::warn!("Schema validation skipped");
        }
        Ok(doc)
    }

    /// Compile to a validated top-level document
    fn to_dict(&self) -> Result<Value> {
        self.to_value(&CompileOptions::default())
    }

    /// Compile to pretty-printed JSON
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_dict()?)
            .map_err(|e| ChartError::WriterError(format!("Failed to serialize chart: {}", e)))
    }

    /// Render through the active Vega-Lite renderer
    fn display(&self) -> Result<MimeBundle>
    where
        Self: Sized,
    {
        crate::display::display(self)
    }

    /// Export to a file; the format defaults to the file extension
    fn save(&self, path: impl AsRef<Path>, format: Option<Format>) -> Result<()>
    where
        Self: Sized,
    {
        crate::writer::save(self, path.as_ref(), format)
    }
}

// ============================================================================
// Unit
// ============================================================================

impl ChartSpec for Chart {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        let scope = self.data.as_ref().or(ctx.data);
        let mark = self.mark.as_ref().ok_or_else(|| {
            ChartError::UsageError(
                "Chart has no mark; call one of the mark_* methods before compiling".to_string(),
            )
        })?;

        let mut view = Map::new();
        if let Some(data) = &self.data {
            view.insert("data".to_string(), data.to_value()?);
        }
        view.insert("mark".to_string(), mark.to_value());
        if !self.encoding.is_empty() {
            view.insert("encoding".to_string(), self.encoding.resolve(scope)?);
        }
        insert_transforms(&mut view, &self.transform)?;
        if !self.selection.is_empty() {
            view.insert("selection".to_string(), self.selection.to_value());
        }
        insert_properties(&mut view, &self.properties)?;
        Ok(view)
    }
}

// ============================================================================
// Composites
// ============================================================================

/// Fields shared by layer and concat charts
struct Composite<'a> {
    key: &'static str,
    data: Option<&'a Data>,
    transform: &'a [Transform],
    resolve: &'a Resolve,
    properties: &'a ViewProperties,
}

impl Composite<'_> {
    fn compile(
        &self,
        children: &[&dyn ChartSpec],
        ctx: &CompileContext<'_>,
    ) -> Result<Map<String, Value>> {
        let child_ctx = CompileContext {
            data: self.data.or(ctx.data),
        };
        let mut compiled = children
            .iter()
            .map(|child| child.compile_view(&child_ctx))
            .collect::<Result<Vec<_>>>()?;

        let mut view = Map::new();
        match self.data {
            Some(data) => {
                let data = data.to_value()?;
                for child in compiled.iter_mut() {
                    if child.get("data") == Some(&data) {
                        child.remove("data");
                    }
                }
                view.insert("data".to_string(), data);
            }
            None => {
                if let Some(shared) = shared_data(&compiled) {
                    tracing::debug!("Hoisting shared data out of {} {} children", compiled.len(), self.key);
                    for child in compiled.iter_mut() {
                        child.remove("data");
                    }
                    view.insert("data".to_string(), shared);
                }
            }
        }
        for child in compiled.iter_mut() {
            lift_top_level(child, &mut view);
        }

        view.insert(
            self.key.to_string(),
            Value::Array(compiled.into_iter().map(Value::Object).collect()),
        );
        insert_transforms(&mut view, self.transform)?;
        insert_resolve(&mut view, self.resolve)?;
        insert_properties(&mut view, self.properties)?;
        Ok(view)
    }
}

/// Data carried identically by every child, if any
fn shared_data(children: &[Map<String, Value>]) -> Option<Value> {
    let first = children.first()?.get("data")?;
    children
        .iter()
        .all(|child| child.get("data") == Some(first))
        .then(|| first.clone())
}

impl ChartSpec for LayerChart {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        let children: Vec<&dyn ChartSpec> = self.layer.iter().map(|c| c as &dyn ChartSpec).collect();
        Composite {
            key: "layer",
            data: self.data.as_ref(),
            transform: &self.transform,
            resolve: &self.resolve,
            properties: &self.properties,
        }
        .compile(&children, ctx)
    }
}

impl ChartSpec for HConcatChart {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        let children: Vec<&dyn ChartSpec> =
            self.hconcat.iter().map(|c| c as &dyn ChartSpec).collect();
        Composite {
            key: "hconcat",
            data: self.data.as_ref(),
            transform: &self.transform,
            resolve: &self.resolve,
            properties: &self.properties,
        }
        .compile(&children, ctx)
    }
}

impl ChartSpec for VConcatChart {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        let children: Vec<&dyn ChartSpec> =
            self.vconcat.iter().map(|c| c as &dyn ChartSpec).collect();
        Composite {
            key: "vconcat",
            data: self.data.as_ref(),
            transform: &self.transform,
            resolve: &self.resolve,
            properties: &self.properties,
        }
        .compile(&children, ctx)
    }
}

// ============================================================================
// Facet
// ============================================================================

impl ChartSpec for FacetChart {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        if self.facet.is_empty() {
            return Err(ChartError::UsageError(
                "Facet requires a row or column field".to_string(),
            ));
        }
        let scope = self.data.as_ref().or(ctx.data);

        let mut facet = Map::new();
        if let Some(row) = &self.facet.row {
            facet.insert("row".to_string(), row.resolve(Channel::Row, scope)?);
        }
        if let Some(column) = &self.facet.column {
            facet.insert("column".to_string(), column.resolve(Channel::Column, scope)?);
        }

        let mut spec = self.spec.compile_view(&CompileContext { data: scope })?;
        let own = self.data.as_ref().map(Data::to_value).transpose()?;

        let mut view = Map::new();
        match (own, spec.remove("data")) {
            (Some(own), Some(inner)) if own != inner => {
                return Err(ChartError::UsageError(
                    "A faceted chart's data must be set on the facet, not on its inner chart"
                        .to_string(),
                ))
            }
            (Some(data), _) | (None, Some(data)) => {
                view.insert("data".to_string(), data);
            }
            (None, None) => {}
        }
        lift_top_level(&mut spec, &mut view);

        view.insert("facet".to_string(), Value::Object(facet));
        view.insert("spec".to_string(), Value::Object(spec));
        insert_transforms(&mut view, &self.transform)?;
        insert_resolve(&mut view, &self.resolve)?;
        insert_properties(&mut view, &self.properties)?;
        Ok(view)
    }
}

impl ChartSpec for FacetSpec {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        match self {
            FacetSpec::Unit(chart) => chart.compile_view(ctx),
            FacetSpec::Layer(chart) => chart.compile_view(ctx),
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

impl ChartSpec for LayerChild {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        match self {
            LayerChild::Unit(chart) => chart.compile_view(ctx),
            LayerChild::Layer(chart) => chart.compile_view(ctx),
        }
    }
}

impl ChartSpec for AnyChart {
    fn compile_view(&self, ctx: &CompileContext<'_>) -> Result<Map<String, Value>> {
        match self {
            AnyChart::Unit(chart) => chart.compile_view(ctx),
            AnyChart::Layer(chart) => chart.compile_view(ctx),
            AnyChart::HConcat(chart) => chart.compile_view(ctx),
            AnyChart::VConcat(chart) => chart.compile_view(ctx),
            AnyChart::Facet(chart) => chart.compile_view(ctx),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn insert_transforms(view: &mut Map<String, Value>, transforms: &[Transform]) -> Result<()> {
    if transforms.is_empty() {
        return Ok(());
    }
    let value = serde_json::to_value(transforms)
        .map_err(|e| ChartError::DataError(format!("Failed to serialize transforms: {}", e)))?;
    view.insert("transform".to_string(), value);
    Ok(())
}

fn insert_resolve(view: &mut Map<String, Value>, resolve: &Resolve) -> Result<()> {
    if resolve.is_empty() {
        return Ok(());
    }
    let value = serde_json::to_value(resolve)
        .map_err(|e| ChartError::DataError(format!("Failed to serialize resolve: {}", e)))?;
    view.insert("resolve".to_string(), value);
    Ok(())
}

fn insert_properties(view: &mut Map<String, Value>, properties: &ViewProperties) -> Result<()> {
    if let Value::Object(obj) = serde_json::to_value(properties)
        .map_err(|e| ChartError::DataError(format!("Failed to serialize properties: {}", e)))?
    {
        view.extend(obj);
    }
    Ok(())
}

/// Move document-only properties of a nested view to its parent
fn lift_top_level(child: &mut Map<String, Value>, parent: &mut Map<String, Value>) {
    for key in TOP_LEVEL_ONLY {
        if let Some(value) = child.remove(*key) {
            parent.entry(key.to_string()).or_insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{hconcat, FacetMapping};
    use crate::encoding::Encoding;
    use crate::schema::Mark;
    use polars::prelude::*;

    fn unit(data: Option<Data>) -> Chart {
        let chart = Chart::default()
            .mark_point()
            .encode(Encoding::new().x("x:Q").y("y:Q"));
        match data {
            Some(data) => chart.data(data),
            None => chart,
        }
    }

    #[test]
    fn test_data_forms() {
        let url = unit(Some("/path/to/my/data.csv".into())).to_dict().unwrap();
        assert_eq!(url["data"], json!({"url": "/path/to/my/data.csv"}));

        let values = json!({"values": [{"x": 1, "y": 2}]});
        let dct = unit(Some(Data::try_from(values.clone()).unwrap()))
            .to_dict()
            .unwrap();
        assert_eq!(dct["data"], values);

        let named = unit(Some(Data::named("Foo"))).to_dict().unwrap();
        assert_eq!(named["data"], json!({"name": "Foo"}));

        let df = df! { "x" => &[1i64, 2], "y" => &[3i64, 4] }.unwrap();
        let framed = unit(Some(df.into())).to_dict().unwrap();
        assert_eq!(
            framed["data"],
            json!({"values": [{"x": 1, "y": 3}, {"x": 2, "y": 4}]})
        );
    }

    #[test]
    fn test_schema_key_and_mark() {
        let dct = unit(None).to_dict().unwrap();
        assert_eq!(dct["$schema"], json!(naming::VEGALITE_SCHEMA_URL));
        assert_eq!(dct["mark"], json!("point"));
        assert!(dct.get("data").is_none());
    }

    #[test]
    fn test_missing_mark_is_usage_error() {
        let err = Chart::new("data.csv").to_dict().unwrap_err();
        assert!(matches!(err, ChartError::UsageError(_)));
    }

    #[test]
    fn test_type_override_for_every_dtype_category() {
        let dates = Series::new("d".into(), &[0i32, 1])
            .cast(&DataType::Date)
            .unwrap();
        let ints = Series::new("i".into(), &[1i64, 2]);
        let strs = Series::new("s".into(), &["a", "b"]);
        let cats = Series::new("c".into(), &["a", "b"])
            .cast(&DataType::from_categories(Categories::global()))
            .unwrap();
        let df = DataFrame::new(vec![dates.into(), ints.into(), strs.into(), cats.into()]).unwrap();

        for (field, inferred) in [
            ("d", "temporal"),
            ("i", "quantitative"),
            ("s", "nominal"),
            ("c", "nominal"),
        ] {
            let chart = Chart::new(df.clone())
                .mark_point()
                .encode(Encoding::new().x(field));
            let dct = chart.to_dict().unwrap();
            assert_eq!(dct["encoding"]["x"]["type"], json!(inferred));

            for explicit in ["quantitative", "nominal", "ordinal", "temporal"] {
                let chart = Chart::new(df.clone())
                    .mark_point()
                    .encode(Encoding::new().x(format!("{}:{}", field, explicit)));
                let dct = chart.to_dict().unwrap();
                assert_eq!(dct["encoding"]["x"]["type"], json!(explicit));
            }
        }
    }

    #[test]
    fn test_identical_child_data_is_hoisted() {
        let chart = unit(Some("a.csv".into())) + unit(Some("a.csv".into()));
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["data"], json!({"url": "a.csv"}));
        for child in dct["layer"].as_array().unwrap() {
            assert!(child.get("data").is_none());
        }
    }

    #[test]
    fn test_differing_child_data_stays() {
        let chart = unit(Some("a.csv".into())) | unit(Some("b.csv".into()));
        let dct = chart.to_dict().unwrap();
        assert!(dct.get("data").is_none());
        assert_eq!(dct["hconcat"][0]["data"], json!({"url": "a.csv"}));
        assert_eq!(dct["hconcat"][1]["data"], json!({"url": "b.csv"}));
    }

    #[test]
    fn test_partial_child_data_stays() {
        let chart = unit(Some("a.csv".into())) & unit(None);
        let dct = chart.to_dict().unwrap();
        assert!(dct.get("data").is_none());
        assert_eq!(dct["vconcat"][0]["data"], json!({"url": "a.csv"}));
    }

    #[test]
    fn test_parent_data_removed_from_matching_children() {
        let chart = (unit(Some("a.csv".into())) + unit(Some("b.csv".into()))).data("a.csv");
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["data"], json!({"url": "a.csv"}));
        assert!(dct["layer"][0].get("data").is_none());
        assert_eq!(dct["layer"][1]["data"], json!({"url": "b.csv"}));
    }

    #[test]
    fn test_children_inherit_data_for_inference() {
        let base = Chart::default().encode(Encoding::new().x("a").y("b"));
        let chart = (base.clone().mark_line() + base.mark_point())
            .data(vec![json!({"a": 1, "b": "u"})]);
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["layer"][1]["encoding"]["y"]["type"], json!("nominal"));
        assert_eq!(dct["layer"][0]["encoding"]["x"]["type"], json!("quantitative"));
    }

    #[test]
    fn test_nested_document_properties_move_up() {
        let left = unit(None).config(json!({"view": {"width": 100}}));
        let chart = hconcat([left, unit(None)]).background("white");
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["config"], json!({"view": {"width": 100}}));
        assert_eq!(dct["background"], json!("white"));
        assert!(dct["hconcat"][0].get("config").is_none());
    }

    #[test]
    fn test_facet_data_conflict() {
        let mut chart = unit(None).facet(FacetMapping::new().row("r:N"));
        chart.data = Some("a.csv".into());
        if let FacetSpec::Unit(inner) = &mut chart.spec {
            inner.data = Some("b.csv".into());
        }
        assert!(matches!(chart.to_dict(), Err(ChartError::UsageError(_))));
    }

    #[test]
    fn test_validation_can_be_skipped() {
        let chart = Chart::new("data.csv")
            .mark(Mark::Point)
            .encode(Encoding::new().x("x:Q"))
            .config(json!({"view": {}}));
        let mut doc = chart.to_value(&CompileOptions::without_validation()).unwrap();
        doc.as_object_mut().unwrap().insert("bogus".into(), json!(1));
        assert!(schema::validate(&doc).is_err());
    }

    #[test]
    fn test_to_json_is_deterministic() {
        let chart = unit(Some(Data::values(vec![json!({"x": 1, "y": 2})])));
        assert_eq!(chart.to_json().unwrap(), chart.to_json().unwrap());
    }

    #[test]
    fn test_scenario_from_values() {
        let chart = Chart::new(Data::try_from(json!({"values": [{"x": 1, "y": 2}]})).unwrap())
            .mark_point()
            .encode(Encoding::new().x("x:Q").y("y:Q"));
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["data"], json!({"values": [{"x": 1, "y": 2}]}));
        assert_eq!(dct["encoding"]["x"], json!({"field": "x", "type": "quantitative"}));
    }
}
