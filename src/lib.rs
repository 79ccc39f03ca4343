/*!
# vlchart - declarative statistical visualization

Build charts from data, marks and encodings; compile them to
[Vega-Lite](https://vega.github.io/vega-lite/) v2 JSON; display them through
pluggable renderers or export them to files.

## Example

```rust
use vlchart::chart::{Chart, ChartSpec};
use vlchart::encoding::Encoding;
use serde_json::json;

let chart = Chart::new(vec![json!({"a": "A", "b": 28}), json!({"a": "B", "b": 55})])
    .mark_bar()
    .encode(Encoding::new().x("a").y("b"));

let dct = chart.to_dict()?;
assert_eq!(dct["encoding"]["x"]["type"], "nominal");
assert_eq!(dct["encoding"]["y"]["type"], "quantitative");
# Ok::<(), vlchart::ChartError>(())
```

## Architecture

- **Charts** are immutable builder values: a unit [`chart::Chart`] or a
  composite (layer, hconcat, vconcat, facet) built with `+`, `|`, `&` or the
  [`chart::layer`], [`chart::hconcat`], [`chart::vconcat`] functions
- **Compilation** resolves encodings against the data in scope, hoists
  shared data and validates the document
- **Output** goes to a renderer registry for notebooks or to an exporter
  for files

## Core Components

- [`schema`] - Vega-Lite object model and document validation
- [`encoding`] - encoding channels, shorthand parsing, type inference
- [`selection`] - interactive selections and their algebra
- [`chart`] - chart types, composition and compilation
- [`display`] - renderer registry and MIME bundles
- [`writer`] - JSON, HTML, PNG and SVG export
- [`config`] - settings file and environment
*/

#[macro_use]
mod macros;

pub mod chart;
pub mod config;
pub mod display;
pub mod encoding;
pub mod naming;
pub mod schema;
pub mod selection;
pub mod writer;

// Re-export key types for convenience
pub use chart::{hconcat, layer, vconcat, Chart, ChartSpec, FacetMapping, LayerChart};
pub use encoding::{Encoding, FieldDef};
pub use schema::{Channel, Data, FieldType, Mark};
pub use selection::{selection_interval, selection_multi, selection_single, Selection};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    #[error("Schema validation error at {path}: {message}")]
    SchemaError { path: String, message: String },

    #[error("Usage error: {0}")]
    UsageError(String),

    #[error("Renderer error: {0}")]
    RendererError(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Output generation error: {0}")]
    WriterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChartError {
    /// Export failed because an optional tool or the network is unavailable
    pub fn is_export_unavailable(&self) -> bool {
        matches!(
            self,
            ChartError::MissingDependency(_) | ChartError::ConnectionError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::encoding::EncodingChannel;
    use crate::schema::ResolveMode;
    use crate::writer::Format;
    use polars::prelude::*;
    use serde_json::json;

    fn cars() -> DataFrame {
        df! {
            "Horsepower" => &[130i64, 165, 150],
            "Miles_per_Gallon" => &[18.0f64, 15.0, 18.0],
            "Origin" => &["USA", "Europe", "Japan"],
            "Year" => &[1970i64, 1971, 1972],
        }
        .unwrap()
    }

    fn scatter() -> Chart {
        Chart::new(cars())
            .mark_point()
            .encode(Encoding::new().x("Horsepower").y("Miles_per_Gallon"))
    }

    #[test]
    fn test_data_key_forms() {
        let forms: Vec<(Data, &str)> = vec![
            ("cars.json".into(), "url"),
            (Data::values(vec![json!({"Horsepower": 1, "Miles_per_Gallon": 2})]), "values"),
            (cars().into(), "values"),
            (Data::named("cars"), "name"),
        ];
        for (data, key) in forms {
            let dct = Chart::new(data)
                .mark_point()
                .encode(Encoding::new().x("Horsepower:Q").y("Miles_per_Gallon:Q"))
                .to_dict()
                .unwrap();
            let obj = dct["data"].as_object().unwrap();
            assert_eq!(obj.keys().collect::<Vec<_>>(), vec![key]);
        }
    }

    #[test]
    fn test_equivalent_channel_forms() {
        let shorthand = scatter().encode(Encoding::new().color("Origin:N"));
        let keyword = scatter().encode(
            Encoding::new().channel(Channel::Color, FieldDef::field("Origin").with_type(FieldType::Nominal)),
        );
        let positional = scatter().encode(Encoding::from_iter([EncodingChannel::color("Origin:N")]));
        let a = shorthand.to_dict().unwrap();
        assert_eq!(a, keyword.to_dict().unwrap());
        assert_eq!(a, positional.to_dict().unwrap());
    }

    #[test]
    fn test_end_to_end_inference() {
        let dct = scatter()
            .encode(Encoding::new().color("Origin"))
            .to_dict()
            .unwrap();
        assert_eq!(dct["encoding"]["x"]["type"], "quantitative");
        assert_eq!(dct["encoding"]["y"]["type"], "quantitative");
        assert_eq!(dct["encoding"]["color"]["type"], "nominal");
        assert_eq!(dct["data"]["values"][0]["Origin"], "USA");
    }

    #[test]
    fn test_categorical_frame() {
        let origin = Series::new("Origin".into(), &["USA", "Europe"])
            .cast(&DataType::from_categories(Categories::global()))
            .unwrap();
        let rank = Series::new("Rank".into(), &[1i64, 2]);
        let df = DataFrame::new(vec![origin.into(), rank.into()]).unwrap();

        let inferred = Chart::new(df.clone())
            .mark_bar()
            .encode(Encoding::new().x("Origin").y("Rank"))
            .to_dict()
            .unwrap();
        assert_eq!(inferred["encoding"]["x"]["type"], "nominal");
        assert_eq!(
            inferred["data"]["values"],
            json!([{"Origin": "USA", "Rank": 1}, {"Origin": "Europe", "Rank": 2}])
        );

        let explicit = Chart::new(df.clone())
            .mark_bar()
            .encode(Encoding::new().x("Origin:O").y("Rank:Q"))
            .to_dict()
            .unwrap();
        assert_eq!(explicit["encoding"]["x"]["type"], "ordinal");
        assert_eq!(explicit["encoding"]["y"]["type"], "quantitative");

        let quantitative = Chart::new(df)
            .mark_bar()
            .encode(Encoding::new().x("Origin:Q"))
            .to_dict()
            .unwrap();
        assert_eq!(quantitative["encoding"]["x"]["type"], "quantitative");
    }

    #[test]
    fn test_layering_is_flat() {
        let chart = scatter() + scatter() + scatter();
        assert_eq!(chart.len(), 3);
        let right = scatter() + (scatter() + scatter());
        assert_eq!(right.len(), 3);

        let mut grown = scatter() + scatter();
        grown += scatter();
        let dct = grown.to_dict().unwrap();
        assert_eq!(dct["layer"].as_array().unwrap().len(), 3);
        assert!(dct["layer"][0].get("layer").is_none());
    }

    #[test]
    fn test_selection_merge() {
        let brush = selection_interval().with_name("brush");
        let click = selection_single().with_name("click");
        let chart = scatter().add_selection((brush.clone() + click).unwrap()).unwrap();
        let dct = chart.to_dict().unwrap();
        let names: Vec<_> = dct["selection"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["brush", "click"]);

        let clash = selection_multi().with_name("brush");
        assert!(matches!(brush + clash, Err(ChartError::UsageError(_))));
    }

    #[test]
    fn test_resolve_only_on_composites() {
        let err = chart::AnyChart::from(scatter())
            .resolve_scale([(Channel::Y, ResolveMode::Independent)])
            .unwrap_err();
        assert_eq!(err.to_string(), "Usage error: 'Chart' object has no attribute 'resolve'");

        let dct = (scatter() + scatter())
            .resolve_scale([(Channel::Y, ResolveMode::Independent)])
            .unwrap()
            .resolve_legend([(Channel::Color, ResolveMode::Shared)])
            .unwrap()
            .to_dict()
            .unwrap();
        assert_eq!(
            dct["resolve"],
            json!({"legend": {"color": "shared"}, "scale": {"y": "independent"}})
        );
    }

    #[test]
    fn test_facet_hoists_data() {
        let dct = scatter()
            .facet(FacetMapping::new().row("Origin:N").column("Year:O"))
            .to_dict()
            .unwrap();
        assert!(dct["spec"].get("data").is_none());
        assert!(dct["data"]["values"].is_array());
        assert_eq!(
            dct["facet"],
            json!({
                "row": {"field": "Origin", "type": "nominal"},
                "column": {"field": "Year", "type": "ordinal"}
            })
        );
    }

    #[test]
    fn test_json_export_is_idempotent() {
        let chart = scatter() | scatter().mark_line();
        let mut first = Vec::new();
        let mut second = Vec::new();
        writer::save_to(&chart, &mut first, Format::Json).unwrap();
        writer::save_to(&chart, &mut second, Format::Json).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_unavailable_is_distinguishable() {
        assert!(ChartError::MissingDependency("vl-convert".into()).is_export_unavailable());
        assert!(ChartError::ConnectionError("offline".into()).is_export_unavailable());
        assert!(!ChartError::UsageError("x".into()).is_export_unavailable());
    }
}
