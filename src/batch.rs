//! Batch orchestration
//!
//! Processes an ordered sequence of capture requests over one shared
//! browser process, one fresh context per request, strictly in input
//! order. Selector waits are bounded and non-fatal in this mode; every
//! request produces a result, and the batch finishes with one HTML report.
//!
//! Requests are deliberately not parallelized: sequential processing keeps
//! output ordering deterministic and avoids contexts competing for the
//! same browser process.

use crate::browser::BrowserController;
use crate::capture::{CaptureExecutor, SelectorWait};
use crate::config::Config;
use crate::error::CaptureError;
use crate::report;
use crate::request::{CaptureRequest, CaptureResult};
use crate::session::SessionStore;
use tracing::{info, warn};

pub struct BatchOrchestrator {
    config: Config,
}

impl BatchOrchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Process every request in order and write the report. Returns the
    /// results in the same order the requests were supplied.
    ///
    /// A selector that never appears downgrades to a per-result warning; a
    /// navigation failure aborts the batch (with all browser resources
    /// released) since there is nothing meaningful to screenshot.
    pub async fn run(
        &self,
        requests: Vec<CaptureRequest>,
    ) -> Result<Vec<CaptureResult>, CaptureError> {
        let session = SessionStore::new(self.config.session_file.clone())
            .load()
            .await?;
        if session.is_some() {
            info!("Using stored session for batch contexts");
        }

        let controller = BrowserController::launch(&self.config, false).await?;
        let executor = CaptureExecutor::new(&self.config);

        let total = requests.len();
        let mut results = Vec::with_capacity(total);

        for (index, request) in requests.into_iter().enumerate() {
            info!("Capturing {}/{}: {}", index + 1, total, request.url);

            let context = match controller
                .new_context(session.as_ref(), request.viewport)
                .await
            {
                Ok(context) => context,
                Err(e) => {
                    controller.close().await;
                    return Err(e);
                }
            };

            let outcome = executor
                .capture(&context, &request, SelectorWait::BATCH)
                .await;
            context.close().await;

            match outcome {
                Ok(result) => {
                    if let Some(warning) = &result.warning {
                        warn!("Request {}: {}", index + 1, warning);
                    }
                    results.push(result);
                }
                Err(e) => {
                    controller.close().await;
                    return Err(e);
                }
            }
        }

        controller.close().await;

        report::write_report(&results, &self.config.report_path).await?;
        info!(
            "Batch complete: {} captures, {} with warnings",
            results.len(),
            results.iter().filter(|r| r.warning.is_some()).count()
        );

        Ok(results)
    }
}
