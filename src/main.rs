use capture_automation::{setup_logging, Cli, CliRunner, Config};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    setup_logging(args.verbose)?;

    let config = load_config(&args).await?;

    let runner = CliRunner::new(config);
    if let Err(e) = runner.run(args.command).await {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn load_config(args: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path).await?;
        serde_json::from_str(&config_content)?
    } else {
        Config::default()
    };

    // Override with CLI arguments
    if args.headless {
        config.headless = true;
    }
    if let Some(chrome_path) = &args.chrome_path {
        config.chrome_path = Some(chrome_path.clone());
    }
    if let Some(session_file) = &args.session_file {
        config.session_file = session_file.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.screenshots_dir = output_dir.clone();
    }

    validate_config(&config)?;

    info!("Session file: {}", config.session_file.display());
    info!("Screenshots directory: {}", config.screenshots_dir.display());

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.viewport.width == 0 || config.viewport.height == 0 {
        return Err("Viewport dimensions must be greater than 0".into());
    }

    if config.navigation_timeout.as_secs() == 0 {
        return Err("Navigation timeout must be greater than 0".into());
    }

    if config.session_file.as_os_str().is_empty() {
        return Err("Session file path must not be empty".into());
    }

    Ok(())
}
