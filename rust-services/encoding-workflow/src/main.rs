//! Encoding Workflow
//!
//! Encodes one input with the adaptive streaming preset, downloads the
//! output, publishes it with multi-DRM protection and prints the playback
//! URLs.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use amsflow_config::WorkflowConfig;
use amsflow_logging::{init, log_format_from_env};
use anyhow::Result;
use encoding_workflow::{connect, Workflow, WorkflowOutcome};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load configuration
    let config = WorkflowConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init("encoding-workflow", config.log_level(), log_format_from_env());

    info!(
        account_name = config.arm.account_name.as_str(),
        resource_group = config.arm.resource_group.as_str(),
        region = config.arm.region.as_str(),
        "Configuration loaded"
    );
    match config.input.input_extension() {
        Some(extension) => info!(extension = extension.as_str(), "Input extension"),
        None => info!("Input has no extension"),
    }

    let (api, blobs) = connect(&config).await.map_err(|e| {
        error!(stage = e.stage(), error = %e, "Could not connect to Media Services");
        anyhow::Error::new(e)
    })?;
    info!("Connected to Media Services");

    let workflow = Workflow::new(config, api, blobs);
    let outcome = workflow.run().await.map_err(|e| {
        error!(stage = e.stage(), error = %e, "Workflow failed");
        anyhow::Error::new(e)
    })?;

    match outcome {
        WorkflowOutcome::Finished(report) => {
            info!(
                job_name = report.job_name.as_str(),
                output_asset = report.output_asset.as_str(),
                files = report.downloads.files.len(),
                directory = %report.downloads.directory.display(),
                "Workflow finished"
            );
            if report.streaming_urls.is_empty() {
                warn!(locator_name = report.locator_name.as_str(), "No streaming URLs were published");
            }
            for url in &report.streaming_urls {
                println!("{}", url);
            }
            Ok(ExitCode::SUCCESS)
        }
        WorkflowOutcome::JobFailed { job_name, error } => {
            let detail = error.map(|e| e.to_string()).unwrap_or_default();
            error!(job_name = job_name.as_str(), error = detail.as_str(), "Job ended in error");
            Ok(ExitCode::FAILURE)
        }
        WorkflowOutcome::Canceled { job_name } => {
            warn!(job_name = job_name.as_str(), "Job was canceled");
            Ok(ExitCode::FAILURE)
        }
        WorkflowOutcome::TimedOut {
            job_name,
            last_state,
        } => {
            warn!(
                job_name = job_name.as_str(),
                last_state = %last_state,
                "Timed out waiting for the job; it may still be running"
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
