//! Settings from `vlchart.toml` and `VLCHART_*` environment variables
//!
//! ```toml
//! renderer = "html"
//! validate = true
//!
//! [aliases]
//! notebook = "jupyterlab"
//!
//! [html]
//! vega_version = "3.3.1"
//!
//! [export]
//! command = "/opt/bin/vl-convert"
//! check_connection = false
//! ```
//!
//! Nested keys are set from the environment with a double underscore, for
//! example `VLCHART_HTML__CDN` or `VLCHART_EXPORT__CHECK_CONNECTION`.

use crate::display::{renderers, DisplayContext};
use crate::writer::{CommandRenderer, Exporter, HtmlOptions};
use crate::{ChartError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_NAME: &str = "vlchart";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Renderer enabled in display contexts
    pub renderer: String,
    /// Validate documents before display
    pub validate: bool,
    /// Extra renderer names, each pointing at a registered renderer
    pub aliases: BTreeMap<String, String>,
    pub html: HtmlOptions,
    pub export: CommandRenderer,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            renderer: "default".to_string(),
            validate: true,
            aliases: BTreeMap::new(),
            html: HtmlOptions::default(),
            export: CommandRenderer::default(),
        }
    }
}

impl Settings {
    /// Load settings; an explicit `path` must exist, the default file may not
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("VLCHART")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .map_err(|e| ChartError::ConfigError(e.to_string()))?;
        tracing::debug!("Loaded settings: renderer={}", settings.renderer);
        Ok(settings)
    }

    /// Configure `ctx`: HTML versions, aliases, validation and the enabled renderer
    pub fn apply(&self, ctx: &mut DisplayContext) -> Result<()> {
        ctx.validate = self.validate;
        ctx.registry.register(
            "html",
            renderers::html_renderer(ctx.kind(), self.html.clone()),
        );
        for (alias, target) in &self.aliases {
            let renderer = ctx.registry.get(target).cloned().ok_or_else(|| {
                ChartError::ConfigError(format!(
                    "Alias '{}' points at unknown renderer '{}'",
                    alias, target
                ))
            })?;
            ctx.registry.register(alias.clone(), renderer);
        }
        ctx.registry
            .enable(&self.renderer)
            .map_err(|e| ChartError::ConfigError(e.to_string()))
    }

    /// Exporter using the configured HTML versions and converter
    pub fn exporter(&self) -> Exporter {
        Exporter::new(self.html.clone(), Arc::new(self.export.clone()))
    }
}
