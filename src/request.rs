//! Capture request modeling and validation
//!
//! A [`CaptureRequest`] is either fully valid or never constructed: every
//! field passes through a pure validator before any browser resource is
//! touched. Deserialization from batch configuration files funnels through
//! the same validators, so a malformed entry fails the whole load up front.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Pixel dimensions of the simulated browser window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Raw viewport value as found in configuration: a literal
/// `(width, height)` pair, a `"WIDTHxHEIGHT"` string, or the explicit
/// dimensions object a serialized request emits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ViewportInput {
    Pair(u32, u32),
    Text(String),
    Size(ViewportSize),
}

impl From<&str> for ViewportInput {
    fn from(s: &str) -> Self {
        ViewportInput::Text(s.to_string())
    }
}

impl From<(u32, u32)> for ViewportInput {
    fn from((width, height): (u32, u32)) -> Self {
        ViewportInput::Pair(width, height)
    }
}

/// Raw, unvalidated capture parameters
///
/// This is the JSON shape of one entry in a batch configuration file and
/// the carrier for raw CLI values. [`CaptureRequest::new`] turns it into a
/// validated request or fails with an error naming the offending field.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaptureSpec {
    pub url: String,
    #[serde(default = "default_wait_time")]
    pub wait_time: u64,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default = "default_fullpage")]
    pub fullpage: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub viewport_size: Option<ViewportInput>,
}

fn default_wait_time() -> u64 {
    5
}

fn default_fullpage() -> bool {
    true
}

/// One validated instruction to navigate to a URL and save a screenshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CaptureSpec")]
pub struct CaptureRequest {
    pub url: Url,
    /// Settle time after page load, in seconds
    pub wait_time: u64,
    /// CSS selector to wait for before capturing
    pub selector: Option<String>,
    /// Capture the entire scrollable page rather than just the viewport
    pub fullpage: bool,
    /// Output filename; synthesized from the capture timestamp when absent
    pub filename: Option<String>,
    /// Serialized under the same name `CaptureSpec` reads it back from
    #[serde(rename = "viewport_size")]
    pub viewport: Option<ViewportSize>,
}

impl CaptureRequest {
    /// Validate raw parameters into a request, or fail with the first
    /// offending field.
    pub fn new(spec: CaptureSpec) -> Result<Self, CaptureError> {
        Ok(Self {
            url: validate_url(&spec.url)?,
            wait_time: spec.wait_time,
            selector: validate_selector(spec.selector)?,
            fullpage: spec.fullpage,
            filename: validate_filename(spec.filename)?,
            viewport: spec.viewport_size.map(validate_viewport).transpose()?,
        })
    }

    /// Viewport as a `(width, height)` pixel pair
    pub fn viewport_pixels(&self) -> Option<(u32, u32)> {
        self.viewport.map(|v| (v.width, v.height))
    }
}

impl TryFrom<CaptureSpec> for CaptureRequest {
    type Error = CaptureError;

    fn try_from(spec: CaptureSpec) -> Result<Self, Self::Error> {
        CaptureRequest::new(spec)
    }
}

/// A request must name an absolute URL with both a scheme and a host.
pub fn validate_url(raw: &str) -> Result<Url, CaptureError> {
    let url = Url::parse(raw).map_err(|e| CaptureError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.host_str().is_none() || url.scheme().is_empty() {
        return Err(CaptureError::InvalidUrl(format!(
            "{raw}: URL must have a scheme and a host"
        )));
    }
    Ok(url)
}

/// Blank selectors normalize to absent; angle brackets and quotes are
/// rejected outright.
pub fn validate_selector(raw: Option<String>) -> Result<Option<String>, CaptureError> {
    let Some(selector) = raw else {
        return Ok(None);
    };
    if selector.trim().is_empty() {
        return Ok(None);
    }
    if selector.chars().any(|c| matches!(c, '<' | '>' | '"' | '\'')) {
        return Err(CaptureError::InvalidSelector(format!(
            "{selector}: contains forbidden characters"
        )));
    }
    Ok(Some(selector))
}

/// Filenames are forced to a `.png` suffix and restricted to
/// `[A-Za-z0-9._-]`.
pub fn validate_filename(raw: Option<String>) -> Result<Option<String>, CaptureError> {
    let Some(mut filename) = raw else {
        return Ok(None);
    };
    if !filename.ends_with(".png") {
        filename.push_str(".png");
    }
    if !filename
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(CaptureError::InvalidFilename(format!(
            "{filename}: contains forbidden characters"
        )));
    }
    Ok(Some(filename))
}

/// Accept a positive pair, or a `"WIDTHxHEIGHT"` string with a
/// case-insensitive separator.
pub fn validate_viewport(input: ViewportInput) -> Result<ViewportSize, CaptureError> {
    let (width, height) = match input {
        ViewportInput::Pair(w, h) => (w, h),
        ViewportInput::Size(size) => (size.width, size.height),
        ViewportInput::Text(text) => {
            let lowered = text.to_lowercase();
            let parse = |part: &str| part.trim().parse::<u32>().ok();
            match lowered.split_once('x') {
                Some((w, h)) => match (parse(w), parse(h)) {
                    (Some(w), Some(h)) => (w, h),
                    _ => {
                        return Err(CaptureError::InvalidViewport(format!(
                            "{text}: expected WIDTHxHEIGHT, e.g. 1920x1080"
                        )))
                    }
                },
                None => {
                    return Err(CaptureError::InvalidViewport(format!(
                        "{text}: expected WIDTHxHEIGHT, e.g. 1920x1080"
                    )))
                }
            }
        }
    };
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidViewport(format!(
            "{width}x{height}: dimensions must be positive"
        )));
    }
    Ok(ViewportSize { width, height })
}

/// Load capture requests from a JSON file holding either a single object
/// or an array of objects. Any invalid entry fails the whole load.
pub async fn load_requests_from_json(path: &Path) -> Result<Vec<CaptureRequest>, CaptureError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CaptureError::FileNotFound(path.display().to_string()),
        _ => CaptureError::IoError(e.to_string()),
    })?;

    let value: serde_json::Value = serde_json::from_str(&content)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(CaptureError::SerializationError(
            "invalid capture configuration: expected an object or an array of objects".to_string(),
        )),
    }
}

/// A request whose screenshot has been written to disk
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub request: CaptureRequest,
    /// Output path, set exactly once, after a successful screenshot write
    pub screenshot_path: std::path::PathBuf,
    pub captured_at: chrono::DateTime<chrono::Local>,
    /// Non-fatal condition recorded during batch processing
    pub warning: Option<String>,
}
