//! JSON export

use super::Writer;
use crate::{ChartError, Result};
use serde_json::Value;

/// Pretty-printed JSON with a trailing newline
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl Writer for JsonWriter {
    type Output = String;

    fn write(&self, spec: &Value) -> Result<String> {
        let mut json = serde_json::to_string_pretty(spec)
            .map_err(|e| ChartError::WriterError(format!("Failed to serialize spec: {}", e)))?;
        json.push('\n');
        Ok(json)
    }
}
