//! Centralized naming conventions for vlchart-generated identifiers and
//! well-known constants.
//!
//! # Categories
//!
//! - **Schema URIs**: `$schema` values for Vega-Lite and Vega documents
//! - **MIME types**: keys used in display bundles
//! - **Renderer groups**: labels for the two renderer registries
//! - **Generated names**: selection names (`selector001`) and HTML element ids

use const_format::concatcp;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

// ============================================================================
// Base Building Blocks
// ============================================================================

/// Base URL of all published schemas
const SCHEMA_BASE: &str = "https://vega.github.io/schema/";

/// Vendor MIME prefix shared by Vega and Vega-Lite
const VND_PREFIX: &str = "application/vnd.";

/// Prefix for automatically named selections
const SELECTION_PREFIX: &str = "selector";

/// Prefix for generated HTML element ids
const ELEMENT_PREFIX: &str = "vlchart-";

// ============================================================================
// Derived Constants
// ============================================================================

/// Vega-Lite major version targeted by the compiler
pub const VEGALITE_VERSION: &str = "v2";

/// Vega major version targeted by raw Vega display
pub const VEGA_VERSION: &str = "v3";

/// `$schema` URI emitted on every top-level Vega-Lite document
pub const VEGALITE_SCHEMA_URL: &str = concatcp!(SCHEMA_BASE, "vega-lite/", VEGALITE_VERSION, ".json");

/// `$schema` URI for raw Vega documents
pub const VEGA_SCHEMA_URL: &str = concatcp!(SCHEMA_BASE, "vega/", VEGA_VERSION, ".json");

/// MIME type for Vega-Lite v2 display bundles
pub const VEGALITE_MIME_TYPE: &str = concatcp!(VND_PREFIX, "vegalite.v2+json");

/// MIME type for Vega display bundles
pub const VEGA_MIME_TYPE: &str = concatcp!(VND_PREFIX, "vega.v2+json");

/// Plain JSON MIME type
pub const JSON_MIME_TYPE: &str = "application/json";

/// HTML MIME type
pub const HTML_MIME_TYPE: &str = "text/html";

/// Plain text MIME type (fallback representation)
pub const TEXT_MIME_TYPE: &str = "text/plain";

/// Label of the Vega-Lite renderer registry
pub const VEGALITE_RENDERER_GROUP: &str = concatcp!("vlchart.vegalite.", VEGALITE_VERSION, ".renderer");

/// Label of the Vega renderer registry
pub const VEGA_RENDERER_GROUP: &str = concatcp!("vlchart.vega.", VEGA_VERSION, ".renderer");

/// Where the display documentation lives
const DISPLAY_DOCS_URL: &str = "https://vega.github.io/vega-lite/usage/embed.html";

/// Text shown in place of a Vega-Lite chart when no frontend can render it
pub const DEFAULT_VEGALITE_DISPLAY: &str = concatcp!(
    "<VegaLite 2 object>\n\n",
    "If you see this message, it means the renderer has not been properly enabled\n",
    "for the frontend that you are using. For more information, see\n",
    DISPLAY_DOCS_URL,
    "\n"
);

/// Text shown in place of a Vega chart when no frontend can render it
pub const DEFAULT_VEGA_DISPLAY: &str = concatcp!(
    "<Vega 2 object>\n\n",
    "If you see this message, it means the renderer has not been properly enabled\n",
    "for the frontend that you are using. For more information, see\n",
    DISPLAY_DOCS_URL,
    "\n"
);

// ============================================================================
// Generated Names
// ============================================================================

/// Process-wide counter backing automatic selection names
static SELECTION_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Generate the next automatic selection name.
///
/// Names are unique for the lifetime of the process: `selector001`,
/// `selector002`, ...
///
/// # Example
/// ```
/// use vlchart::naming;
/// let name = naming::selection_name();
/// assert!(name.starts_with("selector"));
/// assert!(naming::is_generated_selection(&name));
/// ```
pub fn selection_name() -> String {
    let n = SELECTION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}{:03}", SELECTION_PREFIX, n)
}

/// Check if a selection name was produced by [`selection_name`].
///
/// # Example
/// ```
/// use vlchart::naming;
/// assert!(naming::is_generated_selection("selector012"));
/// assert!(!naming::is_generated_selection("brush"));
/// ```
pub fn is_generated_selection(name: &str) -> bool {
    name.strip_prefix(SELECTION_PREFIX)
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Generate a unique HTML element id for an embedded chart.
///
/// Format: `vlchart-<32 hex chars>`
pub fn element_id() -> String {
    format!("{}{}", ELEMENT_PREFIX, Uuid::new_v4().simple())
}
