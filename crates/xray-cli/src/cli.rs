//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use xray_client::PredictionClientConfig;

#[derive(Debug, Parser)]
#[command(
    name = "xray",
    version,
    about = "Classify a chest X-ray with the remote pneumonia prediction service",
    long_about = "xray uploads a chest X-ray image to a pneumonia prediction service and\n\
        prints the returned classification with its confidence.\n\n\
        The service location comes from --url, then XRAY_API_URL (a .env file is\n\
        honored), then http://localhost:5000.\n\n\
        EXAMPLES:\n\
        \n  xray predict scans/patient-17.jpeg          Classify one image\n\
        \n  xray predict --json scan.png                 Print the final state as JSON\n\
        \n  xray --url https://ml.example.com health     Probe the service"
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the prediction service
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload an X-ray image and print the prediction
    Predict(PredictArgs),

    /// Check that the prediction service is up
    Health,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Image file to classify (JPEG, PNG, ...)
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Print the final submission state as JSON
    #[arg(long)]
    pub json: bool,

    /// JPEG quality (1-100) of the uploaded copy
    #[arg(long, value_name = "QUALITY", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

impl Cli {
    /// Layer command-line overrides on top of the environment config.
    pub fn apply_overrides(&self, mut config: PredictionClientConfig) -> PredictionClientConfig {
        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Command::Predict(args) = &self.command {
            if let Some(quality) = args.quality {
                config.jpeg_quality = quality;
            }
        }
        config
    }
}
