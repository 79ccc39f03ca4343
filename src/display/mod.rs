//! Renderer registry and notebook display
//!
//! A [`DisplayContext`] holds a [`PluginRegistry`] of [`Renderer`]s for one
//! spec kind (Vega-Lite or Vega) together with the validation setting used
//! when compiling charts for display. Renderers turn a compiled spec into a
//! [`MimeBundle`] that a notebook frontend can show.
//!
//! Process-wide default contexts back [`display()`] and [`vega()`]; they can be
//! reconfigured through [`with_vegalite_context`] and [`with_vega_context`],
//! or bypassed entirely by building a `DisplayContext` and calling it directly.
//!
//! ```
//! use vlchart::display::{self, Renderer, MimeBundle};
//!
//! display::with_vegalite_context(|ctx| {
//!     ctx.registry.register("plain", Renderer::new(|spec, _| {
//!         Ok(MimeBundle::new().with("text/plain", spec.clone()))
//!     }));
//! });
//! ```

pub mod registry;
pub mod renderers;

pub use registry::PluginRegistry;

use crate::chart::{ChartSpec, CompileOptions};
use crate::{naming, ChartError, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex};

/// Options handed to a renderer on every invocation
pub type Metadata = Map<String, Value>;

// ============================================================================
// MIME bundles
// ============================================================================

/// MIME type → payload mapping plus per-type metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MimeBundle {
    pub data: Map<String, Value>,
    pub metadata: Map<String, Value>,
}

impl MimeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a representation
    pub fn with(mut self, mime_type: impl Into<String>, payload: Value) -> Self {
        self.data.insert(mime_type.into(), payload);
        self
    }

    pub fn get(&self, mime_type: &str) -> Option<&Value> {
        self.data.get(mime_type)
    }

    /// Jupyter `display_data` message content
    pub fn to_display_data(&self) -> Value {
        json!({
            "data": self.data,
            "metadata": self.metadata,
            "transient": {}
        })
    }
}

// ============================================================================
// Renderers
// ============================================================================

/// Render function signature
pub type RenderFn = dyn Fn(&Value, &Metadata) -> Result<MimeBundle> + Send + Sync;

/// A shareable render function
#[derive(Clone)]
pub struct Renderer(Arc<RenderFn>);

impl Renderer {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&Value, &Metadata) -> Result<MimeBundle> + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    pub fn render(&self, spec: &Value, metadata: &Metadata) -> Result<MimeBundle> {
        (self.0)(spec, metadata)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Renderer(..)")
    }
}

/// Which grammar a display context renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    VegaLite,
    Vega,
}

impl SpecKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            SpecKind::VegaLite => naming::VEGALITE_MIME_TYPE,
            SpecKind::Vega => naming::VEGA_MIME_TYPE,
        }
    }

    /// Text shown when no frontend renders the bundle
    pub fn fallback_text(&self) -> &'static str {
        match self {
            SpecKind::VegaLite => naming::DEFAULT_VEGALITE_DISPLAY,
            SpecKind::Vega => naming::DEFAULT_VEGA_DISPLAY,
        }
    }

    /// vega-embed `mode` option
    pub fn embed_mode(&self) -> &'static str {
        match self {
            SpecKind::VegaLite => "vega-lite",
            SpecKind::Vega => "vega",
        }
    }

    pub fn registry_group(&self) -> &'static str {
        match self {
            SpecKind::VegaLite => naming::VEGALITE_RENDERER_GROUP,
            SpecKind::Vega => naming::VEGA_RENDERER_GROUP,
        }
    }
}

// ============================================================================
// Display context
// ============================================================================

/// A renderer registry plus display settings for one spec kind
#[derive(Debug, Clone)]
pub struct DisplayContext {
    kind: SpecKind,
    pub registry: PluginRegistry<Renderer>,
    /// Validate specs before rendering
    pub validate: bool,
}

impl DisplayContext {
    /// A context with the built-in renderers registered and `default` enabled
    pub fn new(kind: SpecKind) -> Self {
        let mut registry = PluginRegistry::new(kind.registry_group());
        for (name, renderer) in renderers::builtin_renderers(kind) {
            registry.register(name, renderer);
        }
        // Freshly registered above
        let _ = registry.enable("default");
        Self {
            kind,
            registry,
            validate: true,
        }
    }

    pub fn vegalite() -> Self {
        Self::new(SpecKind::VegaLite)
    }

    pub fn vega() -> Self {
        Self::new(SpecKind::Vega)
    }

    pub fn kind(&self) -> SpecKind {
        self.kind
    }

    /// Run the active renderer on an already compiled spec
    pub fn render(&self, spec: &Value) -> Result<MimeBundle> {
        let name = self
            .registry
            .active_name()
            .ok_or_else(|| ChartError::RendererError("No renderer is enabled".to_string()))?;
        let renderer = self.registry.active().ok_or_else(|| {
            ChartError::RendererError(format!("Renderer '{}' is not registered", name))
        })?;
        tracing::debug!("Rendering with '{}'", name);
        renderer
            .render(spec, self.registry.options())
            .map_err(|e| match e {
                ChartError::RendererError(_) => e,
                other => ChartError::RendererError(format!("Renderer '{}' failed: {}", name, other)),
            })
    }

    /// Compile a chart and render it
    pub fn display(&self, chart: &impl ChartSpec) -> Result<MimeBundle> {
        let spec = chart.to_value(&CompileOptions {
            validate: self.validate,
        })?;
        self.render(&spec)
    }

    /// Render a raw Vega spec, optionally checking its basic shape first
    pub fn display_vega(&self, spec: &Value, validate: bool) -> Result<MimeBundle> {
        if validate {
            validate_vega(spec)?;
        }
        self.render(spec)
    }
}

/// Structural checks on a raw Vega document
pub fn validate_vega(spec: &Value) -> Result<()> {
    let obj = spec.as_object().ok_or_else(|| ChartError::SchemaError {
        path: "$".to_string(),
        message: "Vega spec must be an object".to_string(),
    })?;
    if let Some(schema) = obj.get("$schema") {
        if !schema.is_string() {
            return Err(ChartError::SchemaError {
                path: "$.$schema".to_string(),
                message: "'$schema' must be a string".to_string(),
            });
        }
    }
    for key in ["data", "marks", "scales", "axes", "legends", "signals"] {
        if let Some(value) = obj.get(key) {
            if !value.is_array() {
                return Err(ChartError::SchemaError {
                    path: format!("$.{}", key),
                    message: format!("'{}' must be an array", key),
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Process-wide defaults
// ============================================================================

static VEGALITE_CONTEXT: LazyLock<Mutex<DisplayContext>> =
    LazyLock::new(|| Mutex::new(DisplayContext::vegalite()));

static VEGA_CONTEXT: LazyLock<Mutex<DisplayContext>> =
    LazyLock::new(|| Mutex::new(DisplayContext::vega()));

/// Access the process-wide Vega-Lite display context
pub fn with_vegalite_context<R>(f: impl FnOnce(&mut DisplayContext) -> R) -> R {
    let mut guard = VEGALITE_CONTEXT
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Access the process-wide Vega display context
pub fn with_vega_context<R>(f: impl FnOnce(&mut DisplayContext) -> R) -> R {
    let mut guard = VEGA_CONTEXT
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Render a chart with the active process-wide Vega-Lite renderer
pub fn display(chart: &impl ChartSpec) -> Result<MimeBundle> {
    // Renderers run outside the lock so they may use the context themselves
    let ctx = with_vegalite_context(|ctx| ctx.clone());
    ctx.display(chart)
}

/// Render a raw Vega spec with the active process-wide Vega renderer
pub fn vega(spec: &Value, validate: bool) -> Result<MimeBundle> {
    let ctx = with_vega_context(|ctx| ctx.clone());
    ctx.display_vega(spec, validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Chart;
    use crate::encoding::Encoding;

    fn chart() -> Chart {
        Chart::new("data.csv")
            .mark_point()
            .encode(Encoding::new().x("x:Q"))
    }

    #[test]
    fn test_new_context_enables_default() {
        let ctx = DisplayContext::vegalite();
        assert_eq!(ctx.registry.active_name(), Some("default"));
        assert_eq!(ctx.registry.group(), naming::VEGALITE_RENDERER_GROUP);
        assert_eq!(ctx.registry.names(), vec!["default", "html", "json", "jupyterlab"]);
    }

    #[test]
    fn test_display_produces_bundle() {
        let bundle = DisplayContext::vegalite().display(&chart()).unwrap();
        let spec = bundle.get(naming::VEGALITE_MIME_TYPE).unwrap();
        assert_eq!(spec["$schema"], json!(naming::VEGALITE_SCHEMA_URL));
        assert!(bundle.get(naming::TEXT_MIME_TYPE).is_some());
    }

    #[test]
    fn test_switching_renderers() {
        let mut ctx = DisplayContext::vegalite();
        ctx.registry.enable("json").unwrap();
        let bundle = ctx.display(&chart()).unwrap();
        assert!(bundle.get(naming::JSON_MIME_TYPE).is_some());
        assert!(ctx.registry.enable("nope").is_err());
        assert_eq!(ctx.registry.active_name(), Some("json"));
    }

    #[test]
    fn test_renderer_failure_surfaces() {
        let mut ctx = DisplayContext::vegalite();
        ctx.registry.register(
            "broken",
            Renderer::new(|_, _| Err(ChartError::DataError("boom".to_string()))),
        );
        ctx.registry.enable("broken").unwrap();
        let err = ctx.display(&chart()).unwrap_err();
        match err {
            ChartError::RendererError(msg) => {
                assert!(msg.contains("'broken'"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_setting_applies() {
        let mut ctx = DisplayContext::vegalite();
        let bad = chart().mark_property("bogus", 1);
        assert!(matches!(ctx.display(&bad), Err(ChartError::SchemaError { .. })));
        ctx.validate = false;
        assert!(ctx.display(&bad).is_ok());
    }

    #[test]
    fn test_display_data_shape() {
        let bundle = MimeBundle::new().with("text/plain", json!("hi"));
        assert_eq!(
            bundle.to_display_data(),
            json!({"data": {"text/plain": "hi"}, "metadata": {}, "transient": {}})
        );
    }

    #[test]
    fn test_vega_display() {
        let ctx = DisplayContext::vega();
        let spec = json!({"$schema": naming::VEGA_SCHEMA_URL, "marks": []});
        let bundle = ctx.display_vega(&spec, true).unwrap();
        assert_eq!(bundle.get(naming::VEGA_MIME_TYPE), Some(&spec));

        let bad = json!({"marks": {}});
        assert!(ctx.display_vega(&bad, true).is_err());
        assert!(ctx.display_vega(&bad, false).is_ok());
    }

    #[test]
    fn test_global_context_display() {
        let bundle = display(&chart()).unwrap();
        assert!(!bundle.data.is_empty());
        let bundle = vega(&json!({}), true).unwrap();
        assert!(!bundle.data.is_empty());
    }
}
