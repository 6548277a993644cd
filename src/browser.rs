//! Browser lifecycle and context management
//!
//! [`BrowserController`] owns exactly one browser process per logical
//! invocation (one single capture, one batch run, or one login flow) and
//! hands out isolated [`CaptureContext`]s, optionally seeded from a stored
//! [`SessionState`]. Contexts are page-scoped: each one starts from a clean
//! cookie jar, applies its own viewport through the device-metrics
//! override, and replays stored cookies and local storage before any
//! navigation happens.

use crate::config::{create_browser_config, Config};
use crate::error::CaptureError;
use crate::request::ViewportSize;
use crate::session::{OriginState, SessionState};
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{ClearBrowserCookiesParams, CookieParam};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// An isolated browsing context holding one page
///
/// Exclusively owned by the request that created it; released via
/// [`CaptureContext::close`] (or dropped with the browser) on every exit
/// path.
pub struct CaptureContext {
    page: Page,
}

impl CaptureContext {
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Read the context's current storage state: cookies plus the current
    /// origin's local storage.
    pub async fn snapshot_session(&self) -> Result<SessionState, CaptureError> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| CaptureError::SessionError(e.to_string()))?;

        let cookies = cookies
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let mut origins = Vec::new();
        if let Some(origin) = self.current_origin().await {
            let entries = self.local_storage_entries().await.unwrap_or_default();
            if !entries.is_empty() {
                origins.push(OriginState {
                    origin,
                    local_storage: entries,
                });
            }
        }

        Ok(SessionState { cookies, origins })
    }

    async fn current_origin(&self) -> Option<String> {
        let origin: String = self
            .page
            .evaluate("location.origin")
            .await
            .ok()?
            .into_value()
            .ok()?;
        // Opaque origins (about:blank, file URLs) serialize as "null"
        if origin == "null" || origin.is_empty() {
            None
        } else {
            Some(origin)
        }
    }

    async fn local_storage_entries(&self) -> Option<Vec<(String, String)>> {
        let raw: String = self
            .page
            .evaluate("JSON.stringify(Object.entries(localStorage))")
            .await
            .ok()?
            .into_value()
            .ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Release the context's page. Tolerates the page (or browser) already
    /// being gone.
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("Page already closed: {e}");
        }
    }
}

/// Owns one browser process and creates contexts on demand
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
    config: Config,
}

impl BrowserController {
    /// Start one browser process. `force_headful` guarantees a visible
    /// window regardless of configuration (the login flow needs one).
    pub async fn launch(config: &Config, force_headful: bool) -> Result<Self, CaptureError> {
        let browser_config = create_browser_config(config, force_headful)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CaptureError::BrowserLaunchFailed(e.to_string()))?;

        // The handler stream must be polled for the CDP connection to make
        // progress; it ends when the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {e}");
                }
            }
            debug!("CDP handler stream ended");
        });

        info!("Browser launched (headful: {})", force_headful || !config.headless);

        Ok(Self {
            browser,
            handler: handler_task,
            config: config.clone(),
        })
    }

    /// Create an isolated context, seeded from `session` when present and
    /// sized to `viewport` (or the configured default).
    pub async fn new_context(
        &self,
        session: Option<&SessionState>,
        viewport: Option<ViewportSize>,
    ) -> Result<CaptureContext, CaptureError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::ContextFailed(e.to_string()))?;

        // Fresh cookie jar per context; seeding below is the only carry-over.
        page.execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| CaptureError::ContextFailed(e.to_string()))?;

        let viewport = viewport.unwrap_or(self.config.viewport);
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(viewport.width)
            .height(viewport.height)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(CaptureError::ContextFailed)?;
        page.execute(metrics)
            .await
            .map_err(|e| CaptureError::ContextFailed(e.to_string()))?;

        if let Some(session) = session {
            self.seed_session(&page, session).await?;
        }

        Ok(CaptureContext { page })
    }

    async fn seed_session(&self, page: &Page, session: &SessionState) -> Result<(), CaptureError> {
        let mut cookies = Vec::new();
        for value in &session.cookies {
            match serde_json::from_value::<CookieParam>(value.clone()) {
                Ok(cookie) => cookies.push(cookie),
                Err(e) => debug!("Skipping unusable cookie record: {e}"),
            }
        }
        if !cookies.is_empty() {
            let count = cookies.len();
            page.set_cookies(cookies)
                .await
                .map_err(|e| CaptureError::SessionError(e.to_string()))?;
            debug!("Seeded {count} cookies into context");
        }

        if !session.origins.is_empty() {
            let script = local_storage_replay_script(&session.origins)?;
            let params = AddScriptToEvaluateOnNewDocumentParams::new(script);
            page.execute(params)
                .await
                .map_err(|e| CaptureError::SessionError(e.to_string()))?;
            debug!("Installed local-storage replay for {} origins", session.origins.len());
        }

        Ok(())
    }

    /// Release the browser and everything it owns. A browser that already
    /// exited (e.g. closed by the operator) is a no-op, not an error.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser already closed: {e}");
        }
        if tokio::time::timeout(Duration::from_secs(5), self.handler)
            .await
            .is_err()
        {
            warn!("CDP handler did not finish within 5s");
        }
        info!("Browser closed");
    }
}

/// Script that replays stored local-storage entries for whichever stored
/// origin the document ends up on. Runs before any page script.
fn local_storage_replay_script(origins: &[OriginState]) -> Result<String, CaptureError> {
    let mut by_origin = serde_json::Map::new();
    for origin in origins {
        by_origin.insert(
            origin.origin.clone(),
            serde_json::to_value(&origin.local_storage)?,
        );
    }
    let table = serde_json::to_string(&serde_json::Value::Object(by_origin))?;

    Ok(format!(
        r#"(() => {{
    const entries = {table}[location.origin];
    if (!entries) return;
    for (const [key, value] of entries) {{
        try {{ localStorage.setItem(key, value); }} catch (_) {{}}
    }}
}})();"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_script_embeds_origin_entries() {
        let origins = vec![OriginState {
            origin: "https://example.com".to_string(),
            local_storage: vec![("token".to_string(), "abc".to_string())],
        }];
        let script = local_storage_replay_script(&origins).unwrap();
        assert!(script.contains("https://example.com"));
        assert!(script.contains("token"));
        assert!(script.contains("localStorage.setItem"));
    }

    #[test]
    fn test_replay_script_empty_origins() {
        let script = local_storage_replay_script(&[]).unwrap();
        assert!(script.contains("location.origin"));
    }
}
