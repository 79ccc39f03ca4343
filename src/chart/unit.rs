//! Single-view charts

use super::facet::{FacetChart, FacetMapping, FacetSpec};
use super::ViewProperties;
use crate::encoding::Encoding;
use crate::schema::{Channel, Data, Mark, MarkDef, Transform};
use crate::selection::{selection_interval, SelectionMapping};
use crate::Result;
use serde_json::Value;

/// A single view: one mark type drawn for each record of its data
///
/// ```
/// use vlchart::chart::{Chart, ChartSpec};
/// use vlchart::encoding::Encoding;
/// use serde_json::json;
///
/// let chart = Chart::new(vec![json!({"x": 1, "y": 2})])
///     .mark_point()
///     .encode(Encoding::new().x("x:Q").y("y:Q"));
/// let dct = chart.to_dict().unwrap();
/// assert_eq!(dct["data"], json!({"values": [{"x": 1, "y": 2}]}));
/// assert_eq!(dct["encoding"]["x"], json!({"field": "x", "type": "quantitative"}));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub data: Option<Data>,
    pub mark: Option<MarkDef>,
    pub encoding: Encoding,
    pub transform: Vec<Transform>,
    pub selection: SelectionMapping,
    pub properties: ViewProperties,
}

macro_rules! mark_methods {
    ($($method:ident => $mark:ident),+ $(,)?) => {
        impl Chart {
            $(
                #[doc = concat!("Draw `", stringify!($mark), "` marks")]
                pub fn $method(self) -> Self {
                    self.mark(Mark::$mark)
                }
            )+
        }
    };
}

mark_methods! {
    mark_area => Area,
    mark_bar => Bar,
    mark_circle => Circle,
    mark_geoshape => Geoshape,
    mark_line => Line,
    mark_point => Point,
    mark_rect => Rect,
    mark_rule => Rule,
    mark_square => Square,
    mark_text => Text,
    mark_tick => Tick,
    mark_trail => Trail,
}

impl Chart {
    /// A chart over `data`
    pub fn new(data: impl Into<Data>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Set the mark, with or without mark properties
    pub fn mark(mut self, mark: impl Into<MarkDef>) -> Self {
        self.mark = Some(mark.into());
        self
    }

    /// Set a property on the current mark (`filled`, `color`, `size`, ...)
    ///
    /// Has no effect before a mark is chosen.
    pub fn mark_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Some(mark) = self.mark.take() {
            self.mark = Some(mark.with_property(key, value));
        }
        self
    }

    /// Add channels; a channel given again replaces the earlier definition
    pub fn encode(mut self, encoding: Encoding) -> Self {
        self.encoding = std::mem::take(&mut self.encoding).merge(encoding);
        self
    }

    /// Attach selections; a name already attached is a usage error
    pub fn add_selection(mut self, selection: impl Into<SelectionMapping>) -> Result<Self> {
        self.selection.extend(selection)?;
        Ok(self)
    }

    /// Make the x and y scales pan- and zoomable
    pub fn interactive(mut self) -> Self {
        let selection = selection_interval()
            .encodings([Channel::X, Channel::Y])
            .bind("scales");
        self.selection.insert(selection);
        self
    }

    /// Repeat this chart per value of the row and/or column fields.
    ///
    /// The chart's data moves to the facet, which serializes it at the top level.
    pub fn facet(mut self, facet: FacetMapping) -> FacetChart {
        let data = self.data.take();
        let mut chart = FacetChart::new(facet, FacetSpec::Unit(self));
        chart.data = data;
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartSpec;
    use crate::schema::{AggregatedField, BinParams, LookupData, Predicate, TimeUnit};
    use crate::schema::{AggregateTransform, BinTransform, CalculateTransform, FilterTransform};
    use crate::schema::{Bin, LookupTransform, TimeUnitTransform};
    use crate::selection::selection_single;
    use crate::ChartError;
    use serde_json::json;

    #[test]
    fn test_mark_methods() {
        assert_eq!(Chart::default().mark_tick().mark, Some(MarkDef::new(Mark::Tick)));
        let chart = Chart::default().mark_point().mark_property("filled", true);
        assert_eq!(
            chart.mark.unwrap().to_value(),
            json!({"type": "point", "filled": true})
        );
    }

    #[test]
    fn test_encode_accumulates() {
        let chart = Chart::default()
            .encode(Encoding::new().x("a:Q"))
            .encode(Encoding::new().y("b:Q"));
        assert_eq!(chart.encoding, Encoding::new().x("a:Q").y("b:Q"));
    }

    #[test]
    fn test_transform_builders() {
        let chart = Chart::default().transform_aggregate(vec![], vec!["foo"]);
        assert_eq!(
            chart.transform,
            vec![Transform::Aggregate(AggregateTransform {
                aggregate: vec![],
                groupby: vec!["foo".to_string()],
            })]
        );

        let chart = Chart::default().transform_bin("binned", "field", true);
        assert_eq!(
            chart.transform,
            vec![Transform::Bin(BinTransform {
                bin: Bin::Flag(true),
                field: "field".to_string(),
                as_: "binned".to_string(),
            })]
        );

        let chart = Chart::default().transform_calculate("calc", "datum.a * 4");
        assert_eq!(
            chart.transform,
            vec![Transform::Calculate(CalculateTransform {
                calculate: "datum.a * 4".to_string(),
                as_: "calc".to_string(),
            })]
        );

        let chart = Chart::default().transform_filter("datum.a < 4");
        assert_eq!(
            chart.transform,
            vec![Transform::Filter(FilterTransform {
                filter: Predicate::Expr("datum.a < 4".to_string()),
            })]
        );

        let lookup_data = LookupData::new("foo.csv", "id", vec!["rate"]);
        let chart = Chart::default().transform_lookup(
            "a",
            lookup_data.clone(),
            Some("a".into()),
            Some("b"),
        );
        assert_eq!(
            chart.transform,
            vec![Transform::Lookup(LookupTransform {
                lookup: "a".to_string(),
                from: lookup_data,
                as_: Some("a".into()),
                default: Some("b".to_string()),
            })]
        );

        let chart = Chart::default().transform_timeunit("foo", "x", TimeUnit::Date);
        assert_eq!(
            chart.transform,
            vec![Transform::TimeUnit(TimeUnitTransform {
                time_unit: TimeUnit::Date,
                field: "x".to_string(),
                as_: "foo".to_string(),
            })]
        );
    }

    #[test]
    fn test_transforms_keep_declaration_order() {
        let chart = Chart::new("data.csv")
            .mark_bar()
            .transform_filter("datum.a > 0")
            .transform_bin("a_bin", "a", BinParams::maxbins(10))
            .transform_aggregate(
                vec![AggregatedField::new(
                    crate::schema::Aggregate::Count,
                    None,
                    "n",
                )],
                vec!["a_bin"],
            )
            .encode(Encoding::new().x("a_bin:O").y("n:Q"));
        let dct = chart.to_dict().unwrap();
        let kinds: Vec<&str> = dct["transform"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| {
                ["filter", "bin", "aggregate"]
                    .into_iter()
                    .find(|k| t.get(*k).is_some())
                    .unwrap()
            })
            .collect();
        assert_eq!(kinds, vec!["filter", "bin", "aggregate"]);
    }

    #[test]
    fn test_add_selection_rejects_duplicates() {
        let sel = selection_single().with_name("click");
        let chart = Chart::default().add_selection(&sel).unwrap();
        let err = chart.add_selection(&sel).unwrap_err();
        assert!(matches!(err, ChartError::UsageError(_)));
    }

    #[test]
    fn test_interactive_binds_scales() {
        let chart = Chart::new("data.csv")
            .mark_point()
            .encode(Encoding::new().x("a:Q").y("b:Q"))
            .interactive();
        let dct = chart.to_dict().unwrap();
        let selections = dct["selection"].as_object().unwrap();
        assert_eq!(selections.len(), 1);
        let def = selections.values().next().unwrap();
        assert_eq!(
            def,
            &json!({"type": "interval", "bind": "scales", "encodings": ["x", "y"]})
        );
    }

    #[test]
    fn test_filter_by_selection() {
        let brush = crate::selection::selection_interval().with_name("brush");
        let chart = Chart::new("data.csv")
            .mark_point()
            .encode(Encoding::new().x("a:Q"))
            .transform_filter(&brush);
        let dct = chart.to_dict().unwrap();
        assert_eq!(dct["transform"], json!([{"filter": {"selection": "brush"}}]));
    }
}
