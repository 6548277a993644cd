use crate::{
    BatchOrchestrator, BrowserController, CaptureExecutor, CaptureRequest, CaptureSpec, Config,
    LoginFlow, LoginOutcome, SelectorWait, SessionStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "capture-automation")]
#[command(about = "Browser-driven screenshot capture with reusable login sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, help = "Configuration file path (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Run the browser without a visible window")]
    pub headless: bool,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Session file path")]
    pub session_file: Option<PathBuf>,

    #[arg(long, help = "Directory screenshots are written to")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to a web service manually and save the session
    Login {
        #[arg(help = "Login URL")]
        url: String,
    },

    /// Capture a screenshot of one URL
    Capture {
        #[arg(help = "URL to capture")]
        url: String,

        #[arg(long, default_value = "5", help = "Wait time after page load (seconds)")]
        wait: u64,

        #[arg(long, help = "CSS selector to wait for")]
        selector: Option<String>,

        #[arg(long, help = "Output filename")]
        filename: Option<String>,

        #[arg(long, help = "Disable full page capture")]
        no_fullpage: bool,

        #[arg(long, help = "Viewport size (e.g. 1920x1080)")]
        viewport: Option<String>,
    },

    /// Capture multiple URLs in order and write an HTML report
    Captures {
        #[arg(
            long,
            num_args = 1..,
            conflicts_with = "json",
            required_unless_present = "json",
            help = "URLs to capture"
        )]
        urls: Option<Vec<String>>,

        #[arg(long, help = "JSON file containing capture configurations")]
        json: Option<PathBuf>,

        #[arg(long, default_value = "5", help = "Wait time after page load (seconds)")]
        wait: u64,

        #[arg(long, help = "CSS selector to wait for")]
        selector: Option<String>,

        #[arg(long, help = "Disable full page capture")]
        no_fullpage: bool,

        #[arg(long, help = "Viewport size (e.g. 1920x1080)")]
        viewport: Option<String>,

        #[arg(long, help = "Report output path")]
        report: Option<PathBuf>,
    },
}

pub struct CliRunner {
    pub config: Config,
}

impl CliRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
        match command {
            Commands::Login { url } => self.run_login(url).await,
            Commands::Capture {
                url,
                wait,
                selector,
                filename,
                no_fullpage,
                viewport,
            } => {
                let request = CaptureRequest::new(CaptureSpec {
                    url,
                    wait_time: wait,
                    selector,
                    fullpage: !no_fullpage,
                    filename,
                    viewport_size: viewport.map(|v| v.as_str().into()),
                })?;
                self.run_capture(request).await
            }
            Commands::Captures {
                urls,
                json,
                wait,
                selector,
                no_fullpage,
                viewport,
                report,
            } => {
                let requests = if let Some(path) = json {
                    crate::request::load_requests_from_json(&path).await?
                } else {
                    let viewport_size = viewport.map(|v| crate::request::ViewportInput::from(v.as_str()));
                    urls.unwrap_or_default()
                        .into_iter()
                        .map(|url| {
                            CaptureRequest::new(CaptureSpec {
                                url,
                                wait_time: wait,
                                selector: selector.clone(),
                                fullpage: !no_fullpage,
                                filename: None,
                                viewport_size: viewport_size.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?
                };
                self.run_captures(requests, report).await
            }
        }
    }

    async fn run_login(&self, url: String) -> Result<(), Box<dyn std::error::Error>> {
        let mut flow = LoginFlow::new(self.config.clone());
        match flow.run(&url).await? {
            LoginOutcome::Saved(path) => {
                println!("Session information saved: {}", path.display());
            }
            LoginOutcome::NotSaved => {
                println!("No session was saved.");
            }
        }
        Ok(())
    }

    async fn run_capture(&self, request: CaptureRequest) -> Result<(), Box<dyn std::error::Error>> {
        info!("Taking screenshot of: {}", request.url);

        let session = SessionStore::new(self.config.session_file.clone())
            .load()
            .await?;

        let controller = BrowserController::launch(&self.config, false).await?;
        let context = match controller.new_context(session.as_ref(), request.viewport).await {
            Ok(context) => context,
            Err(e) => {
                controller.close().await;
                return Err(e.into());
            }
        };

        let executor = CaptureExecutor::new(&self.config);
        let outcome = executor
            .capture(&context, &request, SelectorWait::Unbounded)
            .await;

        context.close().await;
        controller.close().await;

        let result = outcome?;
        println!("Screenshot saved: {}", result.screenshot_path.display());
        Ok(())
    }

    async fn run_captures(
        &self,
        requests: Vec<CaptureRequest>,
        report: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if requests.is_empty() {
            return Err("no capture requests supplied".into());
        }
        info!("Starting batch of {} captures", requests.len());

        let mut config = self.config.clone();
        if let Some(report) = report {
            config.report_path = report;
        }
        let report_path = config.report_path.clone();

        let results = BatchOrchestrator::new(config).run(requests).await?;

        for result in &results {
            println!("URL: {}", result.request.url);
            println!("Saved to: {}", result.screenshot_path.display());
            if let Some(warning) = &result.warning {
                println!("Warning: {warning}");
            }
            println!();
        }
        println!("Report written to: {}", report_path.display());
        Ok(())
    }
}

pub fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}
