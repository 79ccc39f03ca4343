//! Built-in renderers
//!
//! - `default` / `jupyterlab`: the spec under its vendor MIME type, plus a
//!   plain-text fallback explaining how to enable a frontend
//! - `json`: the spec under `application/json`
//! - `html`: a self-loading vega-embed fragment under `text/html`

use super::{Metadata, MimeBundle, Renderer, SpecKind};
use crate::naming;
use crate::writer::html::{embed_fragment, HtmlOptions};
use serde_json::{json, Value};

/// Bundle `spec` under `mime_type` with a text fallback.
///
/// Non-empty renderer options are attached as the metadata of `mime_type`.
pub fn spec_bundle(spec: &Value, mime_type: &str, text: &str, metadata: &Metadata) -> MimeBundle {
    let mut bundle = MimeBundle::new()
        .with(mime_type, spec.clone())
        .with(naming::TEXT_MIME_TYPE, json!(text));
    if !metadata.is_empty() {
        bundle
            .metadata
            .insert(mime_type.to_string(), Value::Object(metadata.clone()));
    }
    bundle
}

/// The vendor MIME renderer for `kind`
pub fn default_renderer(kind: SpecKind) -> Renderer {
    Renderer::new(move |spec, metadata| {
        Ok(spec_bundle(spec, kind.mime_type(), kind.fallback_text(), metadata))
    })
}

/// Plain JSON renderer
pub fn json_renderer(kind: SpecKind) -> Renderer {
    Renderer::new(move |spec, metadata| {
        Ok(spec_bundle(spec, naming::JSON_MIME_TYPE, kind.fallback_text(), metadata))
    })
}

/// vega-embed HTML renderer, loading libraries from `options.cdn`
pub fn html_renderer(kind: SpecKind, options: HtmlOptions) -> Renderer {
    Renderer::new(move |spec, _metadata| {
        let html = embed_fragment(spec, &naming::element_id(), kind, &options)?;
        Ok(MimeBundle::new()
            .with(naming::HTML_MIME_TYPE, json!(html))
            .with(naming::TEXT_MIME_TYPE, json!(kind.fallback_text())))
    })
}

/// Names and constructors of the built-in renderers
pub fn builtin_renderers(kind: SpecKind) -> Vec<(&'static str, Renderer)> {
    vec![
        ("default", default_renderer(kind)),
        ("jupyterlab", default_renderer(kind)),
        ("json", json_renderer(kind)),
        ("html", html_renderer(kind, HtmlOptions::default())),
    ]
}
