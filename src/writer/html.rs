//! Standalone HTML export and the vega-embed bootstrap snippet
//!
//! The bootstrap loads vega, vega-lite and vega-embed from a CDN. Inside
//! notebooks that provide require.js the libraries are loaded through it;
//! elsewhere plain `<script>` tags are appended to the document head.

use super::Writer;
use crate::display::SpecKind;
use crate::{ChartError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Library locations used by the embed snippet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Base URL of the npm CDN
    pub cdn: String,
    pub vega_version: String,
    pub vegalite_version: String,
    pub embed_version: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            cdn: "https://cdn.jsdelivr.net/npm".to_string(),
            vega_version: "3".to_string(),
            vegalite_version: "2".to_string(),
            embed_version: "3".to_string(),
        }
    }
}

impl HtmlOptions {
    fn library(&self, name: &str, version: &str) -> String {
        format!("{}/{}@{}", self.cdn.trim_end_matches('/'), name, version)
    }
}

/// A `<div>` plus script that renders `spec` into it with vega-embed
pub fn embed_fragment(
    spec: &Value,
    element_id: &str,
    kind: SpecKind,
    options: &HtmlOptions,
) -> Result<String> {
    let spec_json = serde_json::to_string(spec)
        .map_err(|e| ChartError::WriterError(format!("Failed to serialize spec: {}", e)))?
        // Keep the spec from closing the surrounding script element
        .replace("</", "<\\/");

    let vega = options.library("vega", &options.vega_version);
    let vegalite = options.library("vega-lite", &options.vegalite_version);
    let embed = options.library("vega-embed", &options.embed_version);

    Ok(format!(
        r#"<div id="{id}"></div>
<script type="text/javascript">
  (function() {{
    const spec = {spec};
    const visId = '{id}';
    const options = {{
      "mode": "{mode}",
      "actions": true
    }};

    if (typeof window.requirejs !== 'undefined') {{
      window.requirejs.config({{
        paths: {{
          'vega': '{vega}?noext',
          'vega-lib': '{vega}/build/vega.min?noext',
          'vega-lite': '{vegalite}?noext',
          'vega-embed': '{embed}?noext'
        }}
      }});
      window.requirejs(["vega-embed"], function(vegaEmbed) {{
        vegaEmbed('#' + visId, spec, options).catch(console.error);
      }});
    }} else {{
      function loadScript(src) {{
        return new Promise((resolve, reject) => {{
          const script = document.createElement('script');
          script.src = src;
          script.onload = resolve;
          script.onerror = reject;
          document.head.appendChild(script);
        }});
      }}

      loadScript('{vega}')
        .then(() => loadScript('{vegalite}'))
        .then(() => loadScript('{embed}'))
        .then(() => {{
          vegaEmbed('#' + visId, spec, options)
            .catch(console.error);
        }})
        .catch(err => {{
          console.error('Failed to load Vega libraries:', err);
        }});
    }}
  }})();
</script>"#,
        id = element_id,
        spec = spec_json,
        mode = kind.embed_mode(),
        vega = vega,
        vegalite = vegalite,
        embed = embed,
    ))
}

/// Writes a complete HTML document embedding the chart
#[derive(Debug, Clone, Default)]
pub struct HtmlWriter {
    pub options: HtmlOptions,
    pub kind: Option<SpecKind>,
}

/// Element id used by exported documents; fixed so output is reproducible
const DOCUMENT_ELEMENT_ID: &str = "vis";

impl HtmlWriter {
    pub fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            kind: None,
        }
    }
}

impl Writer for HtmlWriter {
    type Output = String;

    fn write(&self, spec: &Value) -> Result<String> {
        let kind = self.kind.unwrap_or(SpecKind::VegaLite);
        let body = embed_fragment(spec, DOCUMENT_ELEMENT_ID, kind, &self.options)?;
        Ok(format!(
            r#"
<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    .vega-actions a {{
      margin-right: 12px;
    }}
  </style>
</head>
<body>
{}
</body>
</html>
"#,
            body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_starts_with_doctype() {
        let html = HtmlWriter::default().write(&json!({"mark": "bar"})).unwrap();
        assert!(html.starts_with("\n<!DOCTYPE html>"));
        assert!(html.contains(r#"<div id="vis"></div>"#));
        assert!(html.contains(r#""mode": "vega-lite""#));
    }

    #[test]
    fn test_document_is_deterministic() {
        let spec = json!({"mark": "bar", "data": {"values": [{"a": 1}]}});
        let writer = HtmlWriter::default();
        assert_eq!(writer.write(&spec).unwrap(), writer.write(&spec).unwrap());
    }

    #[test]
    fn test_versions_from_options() {
        let options = HtmlOptions {
            cdn: "https://example.org/npm/".to_string(),
            vega_version: "3.3.1".to_string(),
            vegalite_version: "2.5.0".to_string(),
            embed_version: "3.14".to_string(),
        };
        let html = embed_fragment(&json!({}), "x", SpecKind::VegaLite, &options).unwrap();
        assert!(html.contains("https://example.org/npm/vega@3.3.1"));
        assert!(html.contains("https://example.org/npm/vega-lite@2.5.0"));
        assert!(html.contains("https://example.org/npm/vega-embed@3.14"));
    }

    #[test]
    fn test_script_close_is_escaped() {
        let spec = json!({"title": "</script><b>"});
        let html = embed_fragment(&spec, "x", SpecKind::Vega, &HtmlOptions::default()).unwrap();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r#""mode": "vega""#));
    }
}
