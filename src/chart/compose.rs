//! Chart composition: layering and concatenation
//!
//! Composition never nests a "plain" composite of the same kind (one carrying
//! only children): its children are spliced into the result instead. This
//! keeps `(a + b) + c`, `a + (b + c)` and `layer([a, b, c])` identical.
//! A left operand that already is the target composite is extended in place.

use super::composite::{HConcatChart, LayerChart, LayerChild, VConcatChart};
use super::facet::FacetChart;
use super::unit::Chart;
use super::AnyChart;
use crate::schema::{Channel, ResolveMode};
use crate::{ChartError, Result};
use std::ops::{Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Kind of composition, used by [`AnyChart::extend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    Layer,
    HConcat,
    VConcat,
}

impl Composition {
    /// Operator spelling, for error messages
    pub fn operator(&self) -> &'static str {
        match self {
            Composition::Layer => "+",
            Composition::HConcat => "|",
            Composition::VConcat => "&",
        }
    }
}

// ============================================================================
// Composition functions
// ============================================================================

/// Layer charts on top of each other.
///
/// Only unit and layer charts can be layered; anything else is a usage error.
pub fn layer<I, C>(charts: I) -> Result<LayerChart>
where
    I: IntoIterator<Item = C>,
    C: Into<AnyChart>,
{
    let mut result = LayerChart::default();
    for chart in charts {
        push_layer(&mut result, chart.into())?;
    }
    Ok(result)
}

/// Place charts side by side
pub fn hconcat<I, C>(charts: I) -> HConcatChart
where
    I: IntoIterator<Item = C>,
    C: Into<AnyChart>,
{
    let mut result = HConcatChart::default();
    for chart in charts {
        push_hconcat(&mut result, chart.into());
    }
    result
}

/// Stack charts top to bottom
pub fn vconcat<I, C>(charts: I) -> VConcatChart
where
    I: IntoIterator<Item = C>,
    C: Into<AnyChart>,
{
    let mut result = VConcatChart::default();
    for chart in charts {
        push_vconcat(&mut result, chart.into());
    }
    result
}

fn push_layer(target: &mut LayerChart, chart: AnyChart) -> Result<()> {
    match chart {
        AnyChart::Unit(chart) => target.layer.push(LayerChild::Unit(chart)),
        AnyChart::Layer(chart) if chart.is_plain() => target.layer.extend(chart.layer),
        AnyChart::Layer(chart) => target.layer.push(LayerChild::Layer(chart)),
        other => {
            return Err(ChartError::UsageError(format!(
                "Only Chart and LayerChart objects can be layered, got {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}

fn push_hconcat(target: &mut HConcatChart, chart: AnyChart) {
    match chart {
        AnyChart::HConcat(chart) if chart.is_plain() => target.hconcat.extend(chart.hconcat),
        other => target.hconcat.push(other),
    }
}

fn push_vconcat(target: &mut VConcatChart, chart: AnyChart) {
    match chart {
        AnyChart::VConcat(chart) if chart.is_plain() => target.vconcat.extend(chart.vconcat),
        other => target.vconcat.push(other),
    }
}

// ============================================================================
// Dynamic composition on AnyChart
// ============================================================================

impl AnyChart {
    /// In-place composition: extend `self` when it already is the matching
    /// composite, fail otherwise.
    pub fn extend(&mut self, composition: Composition, other: impl Into<AnyChart>) -> Result<()> {
        let other = other.into();
        match (composition, self) {
            (Composition::Layer, AnyChart::Layer(target)) => push_layer(target, other),
            (Composition::HConcat, AnyChart::HConcat(target)) => {
                push_hconcat(target, other);
                Ok(())
            }
            (Composition::VConcat, AnyChart::VConcat(target)) => {
                push_vconcat(target, other);
                Ok(())
            }
            (composition, target) => Err(ChartError::UsageError(format!(
                "Cannot apply '{}=' to a {}; compose into a new chart instead",
                composition.operator(),
                target.type_name()
            ))),
        }
    }

    /// Compose into a new chart. Layering fails for concatenated or faceted operands.
    pub fn compose(self, composition: Composition, other: impl Into<AnyChart>) -> Result<AnyChart> {
        let other = other.into();
        Ok(match composition {
            Composition::Layer => layer([self, other])?.into(),
            Composition::HConcat => (self | other).into(),
            Composition::VConcat => (self & other).into(),
        })
    }

    pub fn resolve_axis(
        self,
        entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
    ) -> Result<Self> {
        Ok(match self {
            AnyChart::Layer(c) => c.resolve_axis(entries)?.into(),
            AnyChart::HConcat(c) => c.resolve_axis(entries)?.into(),
            AnyChart::VConcat(c) => c.resolve_axis(entries)?.into(),
            AnyChart::Facet(c) => c.resolve_axis(entries)?.into(),
            AnyChart::Unit(_) => return Err(no_resolve()),
        })
    }

    pub fn resolve_legend(
        self,
        entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
    ) -> Result<Self> {
        Ok(match self {
            AnyChart::Layer(c) => c.resolve_legend(entries)?.into(),
            AnyChart::HConcat(c) => c.resolve_legend(entries)?.into(),
            AnyChart::VConcat(c) => c.resolve_legend(entries)?.into(),
            AnyChart::Facet(c) => c.resolve_legend(entries)?.into(),
            AnyChart::Unit(_) => return Err(no_resolve()),
        })
    }

    pub fn resolve_scale(
        self,
        entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
    ) -> Result<Self> {
        Ok(match self {
            AnyChart::Layer(c) => c.resolve_scale(entries)?.into(),
            AnyChart::HConcat(c) => c.resolve_scale(entries)?.into(),
            AnyChart::VConcat(c) => c.resolve_scale(entries)?.into(),
            AnyChart::Facet(c) => c.resolve_scale(entries)?.into(),
            AnyChart::Unit(_) => return Err(no_resolve()),
        })
    }
}

fn no_resolve() -> ChartError {
    ChartError::UsageError("'Chart' object has no attribute 'resolve'".to_string())
}

// ============================================================================
// Operators
// ============================================================================

impl Add for Chart {
    type Output = LayerChart;

    fn add(self, other: Chart) -> LayerChart {
        LayerChart::new(vec![self.into(), other.into()])
    }
}

impl Add<LayerChart> for Chart {
    type Output = LayerChart;

    fn add(self, other: LayerChart) -> LayerChart {
        let mut result = LayerChart::new(vec![self.into()]);
        result += other;
        result
    }
}

impl Add<Chart> for LayerChart {
    type Output = LayerChart;

    fn add(mut self, other: Chart) -> LayerChart {
        self += other;
        self
    }
}

impl Add for LayerChart {
    type Output = LayerChart;

    fn add(mut self, other: LayerChart) -> LayerChart {
        self += other;
        self
    }
}

impl AddAssign<Chart> for LayerChart {
    fn add_assign(&mut self, other: Chart) {
        self.layer.push(LayerChild::Unit(other));
    }
}

impl AddAssign for LayerChart {
    fn add_assign(&mut self, other: LayerChart) {
        if other.is_plain() {
            self.layer.extend(other.layer);
        } else {
            self.layer.push(LayerChild::Layer(other));
        }
    }
}

impl<T: Into<AnyChart>> BitOrAssign<T> for HConcatChart {
    fn bitor_assign(&mut self, other: T) {
        push_hconcat(self, other.into());
    }
}

impl<T: Into<AnyChart>> BitAndAssign<T> for VConcatChart {
    fn bitand_assign(&mut self, other: T) {
        push_vconcat(self, other.into());
    }
}

/// `|` and `&` for left operands that are not already the target composite
macro_rules! concat_operators {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<T: Into<AnyChart>> BitOr<T> for $ty {
                type Output = HConcatChart;

                fn bitor(self, other: T) -> HConcatChart {
                    hconcat([AnyChart::from(self), other.into()])
                }
            }

            impl<T: Into<AnyChart>> BitAnd<T> for $ty {
                type Output = VConcatChart;

                fn bitand(self, other: T) -> VConcatChart {
                    vconcat([AnyChart::from(self), other.into()])
                }
            }
        )+
    };
}

concat_operators!(Chart, LayerChart, FacetChart);

impl<T: Into<AnyChart>> BitOr<T> for HConcatChart {
    type Output = HConcatChart;

    fn bitor(mut self, other: T) -> HConcatChart {
        self |= other;
        self
    }
}

impl<T: Into<AnyChart>> BitAnd<T> for HConcatChart {
    type Output = VConcatChart;

    fn bitand(self, other: T) -> VConcatChart {
        vconcat([AnyChart::from(self), other.into()])
    }
}

impl<T: Into<AnyChart>> BitOr<T> for VConcatChart {
    type Output = HConcatChart;

    fn bitor(self, other: T) -> HConcatChart {
        hconcat([AnyChart::from(self), other.into()])
    }
}

impl<T: Into<AnyChart>> BitAnd<T> for VConcatChart {
    type Output = VConcatChart;

    fn bitand(mut self, other: T) -> VConcatChart {
        self &= other;
        self
    }
}

impl<T: Into<AnyChart>> BitOr<T> for AnyChart {
    type Output = HConcatChart;

    fn bitor(self, other: T) -> HConcatChart {
        match self {
            AnyChart::HConcat(chart) => chart | other,
            chart => hconcat([chart, other.into()]),
        }
    }
}

impl<T: Into<AnyChart>> BitAnd<T> for AnyChart {
    type Output = VConcatChart;

    fn bitand(self, other: T) -> VConcatChart {
        match self {
            AnyChart::VConcat(chart) => chart & other,
            chart => vconcat([chart, other.into()]),
        }
    }
}
