//! PNG and SVG export through an external converter
//!
//! Rasterization is delegated to a [`HeadlessRenderer`]. The default
//! [`CommandRenderer`] shells out to `vl-convert`. When the executable or the
//! network is missing, callers can detect it with
//! [`ChartError::is_export_unavailable`].

use crate::{ChartError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::process::Command;
use std::time::Duration;
use tempfile::TempPath;

/// Image formats produced by headless renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Turns a compiled Vega-Lite document into image bytes
pub trait HeadlessRenderer: fmt::Debug + Send + Sync {
    fn render(&self, spec: &Value, format: ImageFormat) -> Result<Vec<u8>>;
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a Vega-Lite converter executable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandRenderer {
    /// Converter executable, looked up on `PATH`
    pub command: String,
    /// Check that `host` is reachable before converting
    pub check_connection: bool,
    /// `host:port` contacted when `check_connection` is set
    pub host: String,
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self {
            command: "vl-convert".to_string(),
            check_connection: true,
            host: "cdn.jsdelivr.net:443".to_string(),
        }
    }
}

impl CommandRenderer {
    /// Fail with a connection error when `host` is unreachable
    pub fn check_host(&self) -> Result<()> {
        let unreachable =
            |reason: String| ChartError::ConnectionError(format!("Cannot reach {}: {}", self.host, reason));
        let addrs = self
            .host
            .to_socket_addrs()
            .map_err(|e| unreachable(e.to_string()))?;
        let mut last = "no addresses resolved".to_string();
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(_) => return Ok(()),
                Err(e) => last = e.to_string(),
            }
        }
        Err(unreachable(last))
    }

    fn subcommand(format: ImageFormat) -> &'static str {
        match format {
            ImageFormat::Png => "vl2png",
            ImageFormat::Svg => "vl2svg",
        }
    }
}

/// Empty temporary file with `suffix`, removed when the handle drops
fn scratch_path(suffix: &str) -> Result<TempPath> {
    Ok(tempfile::Builder::new()
        .prefix("vlchart-")
        .suffix(suffix)
        .tempfile()?
        .into_temp_path())
}

impl HeadlessRenderer for CommandRenderer {
    fn render(&self, spec: &Value, format: ImageFormat) -> Result<Vec<u8>> {
        if self.check_connection {
            self.check_host()?;
        }

        let json = serde_json::to_vec(spec)
            .map_err(|e| ChartError::WriterError(format!("Failed to serialize spec: {}", e)))?;
        let input = scratch_path(".vl.json")?;
        std::fs::write(&input, json)?;
        let output = scratch_path(&format!(".{}", format.extension()))?;

        tracing::debug!("Running {} {}", self.command, Self::subcommand(format));
        let result = Command::new(&self.command)
            .arg(Self::subcommand(format))
            .arg("--input")
            .arg(&*input)
            .arg("--output")
            .arg(&*output)
            .output();

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ChartError::MissingDependency(format!(
                    "'{}' was not found; install it to export {} images",
                    self.command, format
                )))
            }
            Err(e) => return Err(e.into()),
        };
        if !result.status.success() {
            return Err(ChartError::WriterError(format!(
                "'{}' failed ({}): {}",
                self.command,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        Ok(std::fs::read(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_executable() {
        let renderer = CommandRenderer {
            command: "vlchart-no-such-converter".to_string(),
            check_connection: false,
            ..Default::default()
        };
        let err = renderer.render(&json!({}), ImageFormat::Png).unwrap_err();
        assert!(matches!(err, ChartError::MissingDependency(_)));
        assert!(err.is_export_unavailable());
    }

    #[test]
    fn test_unreachable_host() {
        let renderer = CommandRenderer {
            command: "vlchart-no-such-converter".to_string(),
            check_connection: true,
            host: "127.0.0.1:1".to_string(),
        };
        let err = renderer.render(&json!({}), ImageFormat::Svg).unwrap_err();
        assert!(matches!(err, ChartError::ConnectionError(_)));
        assert!(err.is_export_unavailable());
    }

    #[test]
    fn test_scratch_files_are_removed() {
        let path = scratch_path(".vl.json").unwrap();
        let kept = path.to_path_buf();
        assert!(kept.exists());
        assert!(kept.to_string_lossy().ends_with(".vl.json"));
        drop(path);
        assert!(!kept.exists());
    }

    #[test]
    fn test_defaults() {
        let renderer = CommandRenderer::default();
        assert_eq!(renderer.command, "vl-convert");
        assert_eq!(CommandRenderer::subcommand(ImageFormat::Svg), "vl2svg");
    }
}
