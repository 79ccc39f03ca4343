//! Export of compiled charts
//!
//! Text formats are produced by [`Writer`] implementations, images by a
//! [`HeadlessRenderer`]. An [`Exporter`] combines both and dispatches on
//! [`Format`].
//!
//! # Example
//!
//! ```rust,no_run
//! use vlchart::chart::{Chart, ChartSpec};
//! use vlchart::encoding::Encoding;
//! use vlchart::writer::Format;
//!
//! let chart = Chart::new("cars.json")
//!     .mark_point()
//!     .encode(Encoding::new().x("Horsepower:Q").y("Miles_per_Gallon:Q"));
//! chart.save("cars.html", None)?;
//! chart.save("cars.vl.json", Some(Format::Json))?;
//! # Ok::<(), vlchart::ChartError>(())
//! ```

pub mod headless;
pub mod html;
pub mod json;

pub use headless::{CommandRenderer, HeadlessRenderer, ImageFormat};
pub use html::{HtmlOptions, HtmlWriter};
pub use json::JsonWriter;

use crate::chart::ChartSpec;
use crate::{ChartError, Result};
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Trait for text output writers
pub trait Writer {
    /// The output type produced by this writer.
    type Output;

    /// Generate output from a compiled document
    fn write(&self, spec: &Value) -> Result<Self::Output>;

    /// Compile and validate a chart, then write it
    fn render(&self, chart: &dyn ChartSpec) -> Result<Self::Output> {
        self.write(&chart.to_dict()?)
    }
}

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Html,
    Png,
    Svg,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Json, Format::Html, Format::Png, Format::Svg];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Html => "html",
            Format::Png => "png",
            Format::Svg => "svg",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ChartError::UsageError(format!(
                    "Cannot infer an export format from '{}'; pass one explicitly",
                    path.display()
                ))
            })?;
        ext.parse()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Format::ALL
            .into_iter()
            .find(|format| format.as_str() == lower)
            .ok_or_else(|| {
                ChartError::UsageError(format!(
                    "Unsupported export format '{}'; expected one of json, html, png, svg",
                    s
                ))
            })
    }
}

/// Writes compiled documents in any [`Format`]
#[derive(Debug, Clone)]
pub struct Exporter {
    pub html: HtmlOptions,
    pub headless: Arc<dyn HeadlessRenderer>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            html: HtmlOptions::default(),
            headless: Arc::new(CommandRenderer::default()),
        }
    }
}

impl Exporter {
    pub fn new(html: HtmlOptions, headless: Arc<dyn HeadlessRenderer>) -> Self {
        Self { html, headless }
    }

    /// Encode an already compiled document
    pub fn export_value(&self, spec: &Value, format: Format) -> Result<Vec<u8>> {
        match format {
            Format::Json => JsonWriter.write(spec).map(String::into_bytes),
            Format::Html => HtmlWriter::new(self.html.clone())
                .write(spec)
                .map(String::into_bytes),
            Format::Png => self.headless.render(spec, ImageFormat::Png),
            Format::Svg => self.headless.render(spec, ImageFormat::Svg),
        }
    }

    /// Compile `chart` and write it to `out`
    pub fn save_to(&self, chart: &dyn ChartSpec, out: &mut dyn Write, format: Format) -> Result<()> {
        let bytes = self.export_value(&chart.to_dict()?, format)?;
        out.write_all(&bytes)?;
        Ok(())
    }

    /// Compile `chart` and write it to `path`; the format defaults to the extension
    pub fn save(&self, chart: &dyn ChartSpec, path: &Path, format: Option<Format>) -> Result<()> {
        let format = match format {
            Some(format) => format,
            None => Format::from_path(path)?,
        };
        // Encode before creating the file so failures leave nothing behind
        let bytes = self.export_value(&chart.to_dict()?, format)?;
        File::create(path)?.write_all(&bytes)?;
        tracing::info!("Saved {} chart to {}", format, path.display());
        Ok(())
    }
}

/// Save with the default exporter
pub fn save(chart: &impl ChartSpec, path: &Path, format: Option<Format>) -> Result<()> {
    Exporter::default().save(chart, path, format)
}

/// Write to a stream with the default exporter
pub fn save_to(chart: &impl ChartSpec, out: &mut impl Write, format: Format) -> Result<()> {
    Exporter::default().save_to(chart, out, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Chart;
    use crate::encoding::Encoding;
    use std::path::PathBuf;

    fn chart() -> Chart {
        Chart::new("data.csv")
            .mark_bar()
            .encode(Encoding::new().x("a:N").y("mean(b):Q"))
    }

    #[derive(Debug)]
    struct FakeImages;

    impl HeadlessRenderer for FakeImages {
        fn render(&self, _spec: &Value, format: ImageFormat) -> Result<Vec<u8>> {
            Ok(format!("<{}>", format).into_bytes())
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!(Format::from_path(&PathBuf::from("a/b.svg")).unwrap(), Format::Svg);
        assert!(matches!("pdf".parse::<Format>(), Err(ChartError::UsageError(_))));
        assert!(Format::from_path(&PathBuf::from("noext")).is_err());
    }

    #[test]
    fn test_path_and_stream_agree() {
        let dir = tempfile::tempdir().unwrap();
        for format in [Format::Json, Format::Html] {
            let path = dir.path().join(format!("chart.{}", format));
            chart().save(&path, None).unwrap();
            let mut buf = Vec::new();
            save_to(&chart(), &mut buf, format).unwrap();
            assert_eq!(std::fs::read(&path).unwrap(), buf);
        }
    }

    #[test]
    fn test_json_export_matches_to_dict() {
        let mut buf = Vec::new();
        save_to(&chart(), &mut buf, Format::Json).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, chart().to_dict().unwrap());
    }

    #[test]
    fn test_html_export_starts_with_doctype() {
        let mut buf = Vec::new();
        save_to(&chart(), &mut buf, Format::Html).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("\n<!DOCTYPE html>"));
    }

    #[test]
    fn test_images_use_headless_renderer() {
        let exporter = Exporter::new(HtmlOptions::default(), Arc::new(FakeImages));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        exporter.save(&chart(), &path, None).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<png>");
    }

    #[test]
    fn test_invalid_chart_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        assert!(Chart::new("data.csv").save(&path, None).is_err());
        assert!(!path.exists());
    }
}
