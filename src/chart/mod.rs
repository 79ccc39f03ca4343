//! Chart values and chart algebra
//!
//! - [`Chart`] - a single view: data, mark, encoding, transforms, selections
//! - [`LayerChart`] - views drawn on top of each other
//! - [`HConcatChart`] / [`VConcatChart`] - views placed side by side
//! - [`FacetChart`] - a view repeated per row/column value of a field
//!
//! All chart values are plain data: builders consume and return `Self`, and
//! composition ([`layer`], [`hconcat`], [`vconcat`] or the `+`, `|`, `&`
//! operators) produces new composite values. Compilation to a Vega-Lite
//! document goes through [`ChartSpec`].

use crate::schema::{
    AggregateTransform, AggregatedField, Bin, BinTransform, CalculateTransform, Channel, Data,
    FilterTransform, LookupData, LookupTransform, Names, Predicate, ResolveKind, ResolveMode,
    TimeUnit, TimeUnitTransform, Transform,
};
use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// Builders shared by every chart type: data, transforms, view properties.
macro_rules! view_builders {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// Attach a data reference
                pub fn data(mut self, data: impl Into<Data>) -> Self {
                    self.data = Some(data.into());
                    self
                }

                /// Append an already built transform
                pub fn transform(mut self, transform: Transform) -> Self {
                    self.transform.push(transform);
                    self
                }

                /// Aggregate `aggregate` grouped by `groupby`
                pub fn transform_aggregate(
                    self,
                    aggregate: Vec<AggregatedField>,
                    groupby: Vec<&str>,
                ) -> Self {
                    self.transform(Transform::Aggregate(AggregateTransform {
                        aggregate,
                        groupby: groupby.into_iter().map(str::to_string).collect(),
                    }))
                }

                /// Bin `field` into `as_`
                pub fn transform_bin(
                    self,
                    as_: impl Into<String>,
                    field: impl Into<String>,
                    bin: impl Into<Bin>,
                ) -> Self {
                    self.transform(Transform::Bin(BinTransform {
                        bin: bin.into(),
                        field: field.into(),
                        as_: as_.into(),
                    }))
                }

                /// Compute `as_` from a Vega expression
                pub fn transform_calculate(
                    self,
                    as_: impl Into<String>,
                    calculate: impl Into<String>,
                ) -> Self {
                    self.transform(Transform::Calculate(CalculateTransform {
                        calculate: calculate.into(),
                        as_: as_.into(),
                    }))
                }

                /// Keep rows matching an expression, a field predicate or a selection
                pub fn transform_filter(self, filter: impl Into<Predicate>) -> Self {
                    self.transform(Transform::Filter(FilterTransform {
                        filter: filter.into(),
                    }))
                }

                /// Join fields from a secondary data source on `lookup`
                pub fn transform_lookup(
                    self,
                    lookup: impl Into<String>,
                    from: LookupData,
                    as_: Option<Names>,
                    default: Option<&str>,
                ) -> Self {
                    self.transform(Transform::Lookup(LookupTransform {
                        lookup: lookup.into(),
                        from,
                        as_,
                        default: default.map(str::to_string),
                    }))
                }

                /// Discretize a temporal `field` into `as_`
                pub fn transform_timeunit(
                    self,
                    as_: impl Into<String>,
                    field: impl Into<String>,
                    time_unit: TimeUnit,
                ) -> Self {
                    self.transform(Transform::TimeUnit(TimeUnitTransform {
                        time_unit,
                        field: field.into(),
                        as_: as_.into(),
                    }))
                }

                pub fn width(mut self, width: u32) -> Self {
                    self.properties.width = Some(width);
                    self
                }

                pub fn height(mut self, height: u32) -> Self {
                    self.properties.height = Some(height);
                    self
                }

                pub fn title(mut self, title: impl Into<String>) -> Self {
                    self.properties.title = Some(title.into());
                    self
                }

                pub fn description(mut self, description: impl Into<String>) -> Self {
                    self.properties.description = Some(description.into());
                    self
                }

                pub fn name(mut self, name: impl Into<String>) -> Self {
                    self.properties.name = Some(name.into());
                    self
                }

                /// Background color of the whole document
                pub fn background(mut self, background: impl Into<String>) -> Self {
                    self.properties.background = Some(background.into());
                    self
                }

                pub fn padding(mut self, padding: impl Into<Value>) -> Self {
                    self.properties.padding = Some(padding.into());
                    self
                }

                pub fn autosize(mut self, autosize: impl Into<Value>) -> Self {
                    self.properties.autosize = Some(autosize.into());
                    self
                }

                /// Vega-Lite `config` block of the whole document
                pub fn config(mut self, config: Value) -> Self {
                    self.properties.config = Some(config);
                    self
                }
            }
        )+
    };
}

/// `resolve_*` methods of composite charts
macro_rules! resolve_methods {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// Share or separate axes per channel
                pub fn resolve_axis(
                    mut self,
                    entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
                ) -> Result<Self> {
                    self.resolve.set(ResolveKind::Axis, entries)?;
                    Ok(self)
                }

                /// Share or separate legends per channel
                pub fn resolve_legend(
                    mut self,
                    entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
                ) -> Result<Self> {
                    self.resolve.set(ResolveKind::Legend, entries)?;
                    Ok(self)
                }

                /// Share or separate scales per channel
                pub fn resolve_scale(
                    mut self,
                    entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
                ) -> Result<Self> {
                    self.resolve.set(ResolveKind::Scale, entries)?;
                    Ok(self)
                }
            }
        )+
    };
}

pub mod compile;
pub mod compose;
pub mod composite;
pub mod facet;
pub mod unit;

pub use compile::{ChartSpec, CompileContext, CompileOptions};
pub use compose::{hconcat, layer, vconcat, Composition};
pub use composite::{HConcatChart, LayerChart, LayerChild, VConcatChart};
pub use facet::{FacetChart, FacetMapping, FacetSpec};
pub use unit::Chart;

view_builders!(Chart, LayerChart, HConcatChart, VConcatChart, FacetChart);
resolve_methods!(LayerChart, HConcatChart, VConcatChart, FacetChart);

// ============================================================================
// View properties
// ============================================================================

/// Keys that only a top-level document may carry; nested views hand them up
pub(crate) const TOP_LEVEL_ONLY: &[&str] = &["config", "background", "padding", "autosize"];

/// Sizing, labelling and document-level properties of a view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosize: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl ViewProperties {
    pub fn is_empty(&self) -> bool {
        *self == ViewProperties::default()
    }
}

// ============================================================================
// AnyChart
// ============================================================================

/// Any chart value
#[derive(Debug, Clone, PartialEq)]
pub enum AnyChart {
    Unit(Chart),
    Layer(LayerChart),
    HConcat(HConcatChart),
    VConcat(VConcatChart),
    Facet(FacetChart),
}

impl AnyChart {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyChart::Unit(_) => "Chart",
            AnyChart::Layer(_) => "LayerChart",
            AnyChart::HConcat(_) => "HConcatChart",
            AnyChart::VConcat(_) => "VConcatChart",
            AnyChart::Facet(_) => "FacetChart",
        }
    }
}

impl From<Chart> for AnyChart {
    fn from(chart: Chart) -> Self {
        AnyChart::Unit(chart)
    }
}

impl From<LayerChart> for AnyChart {
    fn from(chart: LayerChart) -> Self {
        AnyChart::Layer(chart)
    }
}

impl From<HConcatChart> for AnyChart {
    fn from(chart: HConcatChart) -> Self {
        AnyChart::HConcat(chart)
    }
}

impl From<VConcatChart> for AnyChart {
    fn from(chart: VConcatChart) -> Self {
        AnyChart::VConcat(chart)
    }
}

impl From<FacetChart> for AnyChart {
    fn from(chart: FacetChart) -> Self {
        AnyChart::Facet(chart)
    }
}
