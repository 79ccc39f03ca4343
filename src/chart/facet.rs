//! Faceted charts

use super::composite::LayerChart;
use super::unit::Chart;
use super::ViewProperties;
use crate::encoding::FieldDef;
use crate::schema::{Data, Resolve, Transform};

/// Row and column fields of a facet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetMapping {
    pub row: Option<FieldDef>,
    pub column: Option<FieldDef>,
}

impl FacetMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Facet rows by a field, given as shorthand or a field definition
    pub fn row(mut self, def: impl Into<FieldDef>) -> Self {
        self.row = Some(def.into());
        self
    }

    /// Facet columns by a field, given as shorthand or a field definition
    pub fn column(mut self, def: impl Into<FieldDef>) -> Self {
        self.column = Some(def.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_none() && self.column.is_none()
    }
}

/// The view repeated in each facet cell
#[derive(Debug, Clone, PartialEq)]
pub enum FacetSpec {
    Unit(Chart),
    Layer(LayerChart),
}

/// A view repeated per value of the row and/or column fields
#[derive(Debug, Clone, PartialEq)]
pub struct FacetChart {
    pub facet: FacetMapping,
    pub spec: FacetSpec,
    pub data: Option<Data>,
    pub transform: Vec<Transform>,
    pub resolve: Resolve,
    pub properties: ViewProperties,
}

impl FacetChart {
    pub fn new(facet: FacetMapping, spec: FacetSpec) -> Self {
        Self {
            facet,
            spec,
            data: None,
            transform: Vec::new(),
            resolve: Resolve::default(),
            properties: ViewProperties::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartSpec;
    use crate::encoding::Encoding;
    use crate::ChartError;
    use serde_json::json;

    #[test]
    fn test_facet_moves_data_to_top_level() {
        let chart = Chart::new("data.csv")
            .mark_point()
            .encode(Encoding::new().x("x:Q").y("y:Q"))
            .facet(FacetMapping::new().row("row:N").column("column:O"));
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["data"], json!({"url": "data.csv"}));
        assert!(dct["spec"].get("data").is_none());
        assert_eq!(
            dct["facet"],
            json!({
                "column": {"field": "column", "type": "ordinal"},
                "row": {"field": "row", "type": "nominal"}
            })
        );
    }

    #[test]
    fn test_facet_infers_from_data() {
        let chart = Chart::new(vec![json!({"a": 1, "b": "u", "c": 2})])
            .mark_point()
            .encode(Encoding::new().x("a").y("c"))
            .facet(FacetMapping::new().column("b"));
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["facet"], json!({"column": {"field": "b", "type": "nominal"}}));
        assert_eq!(dct["spec"]["encoding"]["x"]["type"], json!("quantitative"));
    }

    #[test]
    fn test_empty_facet_is_usage_error() {
        let chart = Chart::new("data.csv")
            .mark_point()
            .encode(Encoding::new().x("x:Q"))
            .facet(FacetMapping::new());
        assert!(matches!(chart.to_dict(), Err(ChartError::UsageError(_))));
    }

    #[test]
    fn test_layer_facet() {
        let base = Chart::default().encode(Encoding::new().x("x:Q").y("y:Q"));
        let layered = (base.clone().mark_line() + base.mark_point()).data("data.csv");
        let dct = layered
            .facet(FacetMapping::new().row("r:N"))
            .to_dict()
            .unwrap();
        assert_eq!(dct["data"], json!({"url": "data.csv"}));
        assert_eq!(dct["spec"]["layer"].as_array().unwrap().len(), 2);
        assert!(dct["spec"].get("data").is_none());
    }
}
