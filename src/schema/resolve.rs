//! Resolution of scales, axes and legends in composite charts

use super::types::Channel;
use crate::{ChartError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

schema_enum! {
    /// Whether composite children share or own a scale/axis/legend
    pub enum ResolveMode: "resolve mode" {
        Shared => "shared",
        Independent => "independent",
    }
}

/// Which part of the view a resolve map applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKind {
    Axis,
    Legend,
    Scale,
}

impl ResolveKind {
    /// Schema key of this resolve map
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveKind::Axis => "axis",
            ResolveKind::Legend => "legend",
            ResolveKind::Scale => "scale",
        }
    }

    /// Channels this resolve map may mention
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            ResolveKind::Axis => &[Channel::X, Channel::Y],
            ResolveKind::Legend => &[
                Channel::Color,
                Channel::Fill,
                Channel::Stroke,
                Channel::Opacity,
                Channel::Shape,
                Channel::Size,
            ],
            ResolveKind::Scale => &[
                Channel::X,
                Channel::Y,
                Channel::Color,
                Channel::Fill,
                Channel::Stroke,
                Channel::Opacity,
                Channel::Shape,
                Channel::Size,
            ],
        }
    }
}

/// Channel → mode mapping for one resolve kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolveMap(BTreeMap<Channel, ResolveMode>);

impl ResolveMap {
    pub fn get(&self, channel: Channel) -> Option<ResolveMode> {
        self.0.get(&channel).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// The `resolve` block of a composite chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolve {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<ResolveMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<ResolveMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ResolveMap>,
}

impl Resolve {
    /// True when no resolve directive has been applied
    pub fn is_empty(&self) -> bool {
        self.axis.is_none() && self.legend.is_none() && self.scale.is_none()
    }

    /// Get the map for a resolve kind
    pub fn map(&self, kind: ResolveKind) -> Option<&ResolveMap> {
        match kind {
            ResolveKind::Axis => self.axis.as_ref(),
            ResolveKind::Legend => self.legend.as_ref(),
            ResolveKind::Scale => self.scale.as_ref(),
        }
    }

    /// Set resolve modes for one kind, rejecting channels the kind does not cover.
    ///
    /// Nothing is recorded when `entries` is empty or any channel is rejected.
    pub fn set(
        &mut self,
        kind: ResolveKind,
        entries: impl IntoIterator<Item = (Channel, ResolveMode)>,
    ) -> Result<()> {
        let allowed = kind.channels();
        let mut checked = Vec::new();
        for (channel, mode) in entries {
            if !allowed.contains(&channel) {
                return Err(ChartError::SchemaError {
                    path: format!("resolve.{}.{}", kind.as_str(), channel),
                    message: format!(
                        "'{}' cannot be resolved for {}. Allowed channels: {}",
                        channel,
                        kind.as_str(),
                        allowed
                            .iter()
                            .map(|c| c.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                });
            }
            checked.push((channel, mode));
        }
        if checked.is_empty() {
            return Ok(());
        }
        let slot = match kind {
            ResolveKind::Axis => &mut self.axis,
            ResolveKind::Legend => &mut self.legend,
            ResolveKind::Scale => &mut self.scale,
        };
        slot.get_or_insert_with(ResolveMap::default).0.extend(checked);
        Ok(())
    }
}
