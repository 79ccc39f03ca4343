//! Layered and concatenated charts

use super::facet::{FacetChart, FacetMapping, FacetSpec};
use super::unit::Chart;
use super::{AnyChart, ViewProperties};
use crate::schema::{Data, Resolve, Transform};

/// A child of a layer: a unit view or a nested layer
#[derive(Debug, Clone, PartialEq)]
pub enum LayerChild {
    Unit(Chart),
    Layer(LayerChart),
}

impl From<Chart> for LayerChild {
    fn from(chart: Chart) -> Self {
        LayerChild::Unit(chart)
    }
}

impl From<LayerChart> for LayerChild {
    fn from(chart: LayerChart) -> Self {
        LayerChild::Layer(chart)
    }
}

/// Views drawn on top of each other, sharing scales unless resolved otherwise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerChart {
    pub layer: Vec<LayerChild>,
    pub data: Option<Data>,
    pub transform: Vec<Transform>,
    pub resolve: Resolve,
    pub properties: ViewProperties,
}

impl LayerChart {
    pub fn new(layer: Vec<LayerChild>) -> Self {
        Self {
            layer,
            ..Self::default()
        }
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    /// Nothing but children: composing with it may splice its children in place
    pub(crate) fn is_plain(&self) -> bool {
        self.data.is_none()
            && self.transform.is_empty()
            && self.resolve.is_empty()
            && self.properties.is_empty()
    }

    /// Repeat the layered view per value of the row and/or column fields
    pub fn facet(mut self, facet: FacetMapping) -> FacetChart {
        let data = self.data.take();
        let mut chart = FacetChart::new(facet, FacetSpec::Layer(self));
        chart.data = data;
        chart
    }
}

macro_rules! concat_chart {
    ($(#[$meta:meta])* $name:ident, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub $field: Vec<AnyChart>,
            pub data: Option<Data>,
            pub transform: Vec<Transform>,
            pub resolve: Resolve,
            pub properties: ViewProperties,
        }

        impl $name {
            pub fn new($field: Vec<AnyChart>) -> Self {
                Self {
                    $field,
                    ..Self::default()
                }
            }

            /// Number of direct children
            pub fn len(&self) -> usize {
                self.$field.len()
            }

            pub fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }

            pub(crate) fn is_plain(&self) -> bool {
                self.data.is_none()
                    && self.transform.is_empty()
                    && self.resolve.is_empty()
                    && self.properties.is_empty()
            }
        }
    };
}

concat_chart!(
    /// Views placed side by side
    HConcatChart,
    hconcat
);

concat_chart!(
    /// Views stacked top to bottom
    VConcatChart,
    vconcat
);
