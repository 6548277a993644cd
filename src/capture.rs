//! Single-capture execution
//!
//! [`CaptureExecutor`] drives one validated [`CaptureRequest`] through a
//! [`CaptureContext`]: navigate, wait for the selector under the caller's
//! policy, let the page settle, then write the screenshot and stamp the
//! result.

use crate::browser::CaptureContext;
use crate::config::Config;
use crate::error::CaptureError;
use crate::request::{CaptureRequest, CaptureResult};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long to wait for a requested selector to appear
///
/// A standalone capture waits without bound; a batch-sequenced capture
/// gives up after ten seconds, records a warning, and screenshots anyway.
/// The asymmetry is deliberate and mirrors the two call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorWait {
    Unbounded,
    Bounded(Duration),
}

impl SelectorWait {
    /// The fixed batch-mode policy: bounded at 10 seconds, non-fatal.
    pub const BATCH: SelectorWait = SelectorWait::Bounded(Duration::from_secs(10));
}

/// Performs one capture through a browsing context
pub struct CaptureExecutor {
    screenshots_dir: PathBuf,
    navigation_timeout: Duration,
}

impl CaptureExecutor {
    pub fn new(config: &Config) -> Self {
        Self {
            screenshots_dir: config.screenshots_dir.clone(),
            navigation_timeout: config.navigation_timeout,
        }
    }

    pub fn screenshots_dir(&self) -> &PathBuf {
        &self.screenshots_dir
    }

    /// Run one capture. Navigation failure is fatal for this request; a
    /// bounded selector wait that times out is recorded on the result as a
    /// warning instead.
    pub async fn capture(
        &self,
        context: &CaptureContext,
        request: &CaptureRequest,
        selector_wait: SelectorWait,
    ) -> Result<CaptureResult, CaptureError> {
        tokio::fs::create_dir_all(&self.screenshots_dir).await?;

        let page = context.page();
        self.navigate(page, request).await?;

        let mut warning = None;
        if let Some(selector) = &request.selector {
            warning = self.await_selector(page, selector, selector_wait).await;
            if let Some(message) = &warning {
                warn!("{message}");
            }
        }

        // Settle time for deferred rendering after load
        if request.wait_time > 0 {
            sleep(Duration::from_secs(request.wait_time)).await;
        }

        let captured_at = chrono::Local::now();
        let filename = request
            .filename
            .clone()
            .unwrap_or_else(|| default_filename(captured_at));
        let screenshot_path = self.screenshots_dir.join(&filename);

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(request.fullpage)
            .build();
        let data = page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
        tokio::fs::write(&screenshot_path, &data).await?;

        info!("Screenshot saved: {}", screenshot_path.display());

        Ok(CaptureResult {
            request: request.clone(),
            screenshot_path,
            captured_at,
            warning,
        })
    }

    async fn navigate(&self, page: &Page, request: &CaptureRequest) -> Result<(), CaptureError> {
        let load = async {
            page.goto(request.url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };

        match timeout(self.navigation_timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CaptureError::NavigationFailed {
                url: request.url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CaptureError::NavigationFailed {
                url: request.url.to_string(),
                reason: format!("no load event within {:?}", self.navigation_timeout),
            }),
        }
    }

    /// Wait for `selector` to appear. Returns a warning message when a
    /// bounded wait expires; an unbounded wait only returns on success.
    async fn await_selector(
        &self,
        page: &Page,
        selector: &str,
        policy: SelectorWait,
    ) -> Option<String> {
        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };

        match policy {
            SelectorWait::Unbounded => {
                poll.await;
                None
            }
            SelectorWait::Bounded(limit) => match timeout(limit, poll).await {
                Ok(()) => None,
                Err(_) => Some(format!(
                    "Selector '{selector}' did not appear within {limit:?}; capturing anyway"
                )),
            },
        }
    }
}

/// Default output name synthesized from the capture timestamp, at second
/// resolution. Two captures completing within the same second and both
/// lacking an explicit filename resolve to the same name and overwrite
/// each other; this is a documented limitation, not corrected here.
pub fn default_filename(at: chrono::DateTime<chrono::Local>) -> String {
    format!("capture_{}.png", at.format("%Y%m%d_%H%M%S"))
}
