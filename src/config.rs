//! Configuration management with serde serialization/deserialization
//!
//! Runtime settings for the capture tool: where the session file and
//! screenshots live, how the browser is launched, and the default viewport
//! applied when a request does not carry its own.

use crate::request::ViewportSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the capture tool
///
/// Constructed once at program entry (defaults, optionally overlaid with a
/// JSON config file and CLI flags) and passed into the components that need
/// it.
///
/// # Examples
///
/// ```rust
/// use capture_automation::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Create custom configuration
/// let config = Config {
///     headless: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Path of the persisted browsing-session file (default: `data/browser_session.json`)
    ///
    /// Written wholesale by the login flow, read by the browser controller
    /// to seed authenticated contexts.
    pub session_file: PathBuf,

    /// Directory screenshots are written to (default: `screenshots`)
    ///
    /// Created on demand, parents included.
    pub screenshots_dir: PathBuf,

    /// Path of the batch HTML report (default: `capture_results.html`)
    pub report_path: PathBuf,

    /// Launch the browser without a visible window (default: false)
    ///
    /// The login flow always opens a visible browser regardless of this
    /// setting, since a human has to interact with it.
    pub headless: bool,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Viewport applied to contexts whose request carries no viewport
    pub viewport: ViewportSize,

    /// Timeout for page navigation (default: 30 seconds)
    ///
    /// Bounds only the initial load of a page. Selector waits follow their
    /// own per-caller policy.
    pub navigation_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_file: PathBuf::from("data/browser_session.json"),
            screenshots_dir: PathBuf::from("screenshots"),
            report_path: PathBuf::from("capture_results.html"),
            headless: false,
            chrome_path: None,
            viewport: ViewportSize {
                width: 1920,
                height: 1080,
            },
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

/// Generate Chrome command-line arguments based on configuration
///
/// # Examples
///
/// ```rust
/// use capture_automation::{get_chrome_args, Config};
///
/// let config = Config::default();
/// let args = get_chrome_args(&config);
/// assert!(args.iter().any(|a| a.starts_with("--window-size")));
/// ```
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    vec![
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-sync".to_string(),
        "--disable-default-apps".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
    ]
}

/// Assemble a `chromiumoxide` browser configuration
///
/// `force_headful` overrides `config.headless`; the login flow uses it so
/// the operator always gets a window to log in through.
pub fn create_browser_config(
    config: &Config,
    force_headful: bool,
) -> Result<chromiumoxide::browser::BrowserConfig, crate::error::CaptureError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_chrome_args(config));

    if force_headful || !config.headless {
        builder = builder.with_head();
    }

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder
        .build()
        .map_err(crate::error::CaptureError::ConfigurationError)
}
