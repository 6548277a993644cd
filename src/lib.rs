//! # Capture Automation
//!
//! Browser-driven screenshot capture with reusable authenticated sessions.
//! The tool opens a real browser once for a manual login, persists the
//! resulting session state to a file, then replays that state into
//! isolated browsing contexts for single or batched screenshot captures,
//! finishing a batch with a self-contained HTML report.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use capture_automation::{
//!     BrowserController, CaptureExecutor, CaptureRequest, CaptureSpec, Config, SelectorWait,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let request = CaptureRequest::new(CaptureSpec {
//!         url: "https://example.com".to_string(),
//!         wait_time: 5,
//!         fullpage: true,
//!         ..Default::default()
//!     })?;
//!
//!     let controller = BrowserController::launch(&config, false).await?;
//!     let context = controller.new_context(None, request.viewport).await?;
//!     let result = CaptureExecutor::new(&config)
//!         .capture(&context, &request, SelectorWait::Unbounded)
//!         .await?;
//!     println!("Saved to {}", result.screenshot_path.display());
//!
//!     context.close().await;
//!     controller.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Log in once, manually, and save the session
//! capture-automation login https://console.example.com/login
//!
//! # Single capture reusing the session
//! capture-automation capture https://console.example.com/dashboard --viewport 1920x1080
//!
//! # Batch from a JSON configuration, with an HTML report
//! capture-automation captures --json captures.json
//! ```

/// Configuration and browser launch settings
pub mod config;

/// Error types
pub mod error;

/// Capture request modeling and validation
pub mod request;

/// Browsing-session persistence
pub mod session;

/// Browser lifecycle and context management
pub mod browser;

/// Single-capture execution
pub mod capture;

/// Manual login flow
pub mod login;

/// Sequential batch orchestration
pub mod batch;

/// HTML report rendering
pub mod report;

/// Command-line interface implementation
pub mod cli;

#[cfg(test)]
mod tests;

pub use batch::*;
pub use browser::*;
pub use capture::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use login::*;
pub use report::*;
pub use request::*;
pub use session::*;
