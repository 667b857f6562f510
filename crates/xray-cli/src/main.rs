//! Terminal front-end for chest X-ray pneumonia prediction.

mod cli;
mod logging;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use xray_client::{PredictionClient, PredictionClientConfig, SubmissionController};
use xray_models::SubmissionState;

use crate::cli::{Cli, Command, PredictArgs};

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS); a provider
    // already installed by the process is fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.apply_overrides(
        PredictionClientConfig::from_env().context("invalid environment configuration")?,
    );
    let client = PredictionClient::new(config).context("failed to create prediction client")?;
    info!(url = %client.predict_url(), "Using prediction service");

    match &cli.command {
        Command::Predict(args) => predict(client, args).await,
        Command::Health => health(client).await,
    }
}

async fn predict(client: PredictionClient, args: &PredictArgs) -> anyhow::Result<ExitCode> {
    let controller = SubmissionController::new(client);
    let follower = tokio::spawn(render::follow(controller.subscribe()));

    // A decode failure is already reflected in the published state
    if controller.select_image(args.image.as_path()).await.is_ok() {
        let mut handle = controller
            .submit()
            .await
            .context("image selected but submission was refused")?;

        tokio::select! {
            joined = &mut handle => {
                if let Err(e) = joined {
                    warn!(error = %e, "Submission task ended abnormally");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cancelling submission");
                controller.cancel().await;
                let _ = handle.await;
            }
        }
    }

    let state = controller.state();
    drop(controller);
    follower.await.ok();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", render::final_report(&state));
    }

    Ok(match state {
        SubmissionState::ResultReady { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn health(client: PredictionClient) -> anyhow::Result<ExitCode> {
    if client.health_check().await? {
        println!("healthy");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("unhealthy");
        Ok(ExitCode::FAILURE)
    }
}
