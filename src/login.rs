//! Human-in-the-loop login flow
//!
//! Opens a visible browser on the login page, then waits for the operator
//! to authenticate and close the window. There is no programmatic login
//! and no timeout on the wait: the flow terminates only on the operator's
//! action. Once the browser goes away, the most recent session snapshot is
//! persisted wholesale through [`SessionStore`].

use crate::browser::BrowserController;
use crate::config::Config;
use crate::error::CaptureError;
use crate::session::{SessionState, SessionStore};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const CLOSE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls needed to fail back-to-back before the browser counts as closed.
/// A single failed poll can be a transient devtools hiccup (for example
/// during a login redirect) and must not end the wait.
const CLOSE_CONFIRM_POLLS: u32 = 3;

/// Tracks consecutive session-poll failures while waiting for the
/// operator to close the window.
#[derive(Debug, Default)]
struct CloseDetector {
    consecutive_failures: u32,
}

impl CloseDetector {
    fn poll_succeeded(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Returns true once enough polls have failed in a row to conclude
    /// the browser is gone.
    fn poll_failed(&mut self) -> bool {
        self.consecutive_failures += 1;
        self.consecutive_failures >= CLOSE_CONFIRM_POLLS
    }
}

/// Progress of one login flow, in order of transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    BrowserOpen,
    AwaitingManualClose,
    SessionPersisted,
    Closed,
    Failed,
}

/// Terminal outcome: where the session landed, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session written to this path
    Saved(PathBuf),
    /// Login happened (or was abandoned) but no session could be saved
    NotSaved,
}

pub struct LoginFlow {
    config: Config,
    store: SessionStore,
    state: LoginState,
}

impl LoginFlow {
    pub fn new(config: Config) -> Self {
        let store = SessionStore::new(config.session_file.clone());
        Self {
            config,
            store,
            state: LoginState::Idle,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    fn transition(&mut self, next: LoginState) {
        debug!("Login flow: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run the flow to completion. Unrecoverable launch/navigation errors
    /// propagate; a session that cannot be persisted after a completed
    /// login is reported as [`LoginOutcome::NotSaved`], not raised.
    pub async fn run(&mut self, login_url: &str) -> Result<LoginOutcome, CaptureError> {
        let existing = self.store.load().await?;
        if existing.is_some() {
            println!("Loaded previous session information.");
        } else {
            println!("Starting a new session.");
        }

        // Login always gets a visible window: the human does the work.
        let controller = BrowserController::launch(&self.config, true).await?;
        let context = match controller.new_context(existing.as_ref(), None).await {
            Ok(context) => context,
            Err(e) => {
                self.transition(LoginState::Failed);
                controller.close().await;
                return Err(e);
            }
        };

        if let Err(e) = context.page().goto(login_url).await {
            self.transition(LoginState::Failed);
            context.close().await;
            controller.close().await;
            return Err(CaptureError::NavigationFailed {
                url: login_url.to_string(),
                reason: e.to_string(),
            });
        }
        self.transition(LoginState::BrowserOpen);

        println!("A browser window has opened. Please complete the login manually.");
        println!("Close the browser when you are done; the session will be saved.");

        self.transition(LoginState::AwaitingManualClose);
        let snapshot = self.await_manual_close(&context).await;

        // The window is gone; the context died with it.
        let outcome = match snapshot {
            Some(state) => match self.store.save(&state).await {
                Ok(()) => {
                    self.transition(LoginState::SessionPersisted);
                    println!(
                        "Browser closed. Session information saved to {}.",
                        self.store.path().display()
                    );
                    LoginOutcome::Saved(self.store.path().to_path_buf())
                }
                Err(e) => {
                    self.transition(LoginState::Failed);
                    warn!("Failed to persist session: {e}");
                    println!("Browser closed, but no session was saved: {e}");
                    LoginOutcome::NotSaved
                }
            },
            None => {
                self.transition(LoginState::Failed);
                println!("Browser closed before any session state could be read; no session saved.");
                LoginOutcome::NotSaved
            }
        };

        // Browser is usually already gone at this point; closing again is
        // a tolerated no-op.
        context.close().await;
        controller.close().await;
        if self.state == LoginState::SessionPersisted {
            self.transition(LoginState::Closed);
        }

        Ok(outcome)
    }

    /// Block until the operator closes the browser. Each poll refreshes
    /// the session snapshot, so the state captured just before the close
    /// is what gets persisted; the devtools connection dies with the
    /// window and cannot be read afterwards.
    async fn await_manual_close(
        &self,
        context: &crate::browser::CaptureContext,
    ) -> Option<SessionState> {
        let mut latest: Option<SessionState> = None;
        let mut detector = CloseDetector::default();
        loop {
            match context.snapshot_session().await {
                Ok(state) => {
                    detector.poll_succeeded();
                    if !state.is_empty() {
                        latest = Some(state);
                    }
                }
                Err(e) => {
                    if detector.poll_failed() {
                        debug!("Session polls keep failing, treating browser as closed: {e}");
                        return latest;
                    }
                    debug!("Session poll failed, retrying: {e}");
                }
            }
            sleep(CLOSE_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_starts_idle() {
        let flow = LoginFlow::new(Config::default());
        assert_eq!(flow.state(), LoginState::Idle);
    }

    #[test]
    fn test_transient_poll_failure_does_not_end_wait() {
        let mut detector = CloseDetector::default();
        // One hiccup, then recovery: the wait must continue.
        assert!(!detector.poll_failed());
        detector.poll_succeeded();
        assert!(!detector.poll_failed());
        assert!(!detector.poll_failed());
        // Only an unbroken run of failures concludes the browser is gone.
        assert!(detector.poll_failed());
    }

    #[test]
    fn test_transitions_are_recorded() {
        let mut flow = LoginFlow::new(Config::default());
        flow.transition(LoginState::BrowserOpen);
        flow.transition(LoginState::AwaitingManualClose);
        assert_eq!(flow.state(), LoginState::AwaitingManualClose);
        flow.transition(LoginState::Failed);
        assert_eq!(flow.state(), LoginState::Failed);
    }
}
