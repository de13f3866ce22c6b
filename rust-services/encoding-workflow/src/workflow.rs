//! End-to-end encoding workflow
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
use amsflow_types::{Job, JobError, JobState};
use media_services_client::{
    ArmClient, BlobStorage, MediaServicesApi, MediaServicesError, SasBlobClient,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::assets::AssetProvisioner;
use crate::delivery::DeliveryProvisioner;
use crate::ensure::ensure_transform;
use crate::error::WorkflowError;
use crate::jobs::{resolve_job_input, JobSubmitter};
use crate::naming::RunNames;
use crate::poller::{JobPoller, PollOutcome};
use crate::results::{DownloadSummary, ResultFetcher};

/// Built-in preset the transform encodes with
pub const ADAPTIVE_STREAMING_PRESET: &str = "AdaptiveStreaming";

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub job_name: String,
    pub output_asset: String,
    pub locator_name: String,
    pub streaming_urls: Vec<String>,
    pub downloads: DownloadSummary,
    /// Input asset created for a local file and deleted at cleanup
    pub deleted_input_asset: Option<String>,
}

/// How a run ended when no stage failed
#[derive(Debug, Clone)]
pub enum WorkflowOutcome {
    Finished(WorkflowReport),
    JobFailed {
        job_name: String,
        error: Option<JobError>,
    },
    Canceled {
        job_name: String,
    },
    TimedOut {
        job_name: String,
        last_state: JobState,
    },
}

impl WorkflowOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, WorkflowOutcome::Finished(_))
    }
}

/// Authenticate against the management API and build both remote clients.
pub async fn connect(
    config: &WorkflowConfig,
) -> Result<(Arc<dyn MediaServicesApi>, Arc<dyn BlobStorage>), WorkflowError> {
    let api = ArmClient::connect(config)
        .await
        .map_err(WorkflowError::Authentication)?;
    let http = media_services_client::build_http_client(config.http_timeout)
        .map_err(WorkflowError::Authentication)?;

    Ok((Arc::new(api), Arc::new(SasBlobClient::new(http))))
}

/// One encode, download and publish pass over the configured input
pub struct Workflow {
    config: WorkflowConfig,
    api: Arc<dyn MediaServicesApi>,
    assets: AssetProvisioner,
    submitter: JobSubmitter,
    poller: JobPoller,
    fetcher: ResultFetcher,
    delivery: DeliveryProvisioner,
}

impl Workflow {
    pub fn new(
        config: WorkflowConfig,
        api: Arc<dyn MediaServicesApi>,
        blobs: Arc<dyn BlobStorage>,
    ) -> Self {
        let naming = &config.naming;
        Self {
            assets: AssetProvisioner::new(api.clone(), blobs.clone(), config.sas_expiry),
            submitter: JobSubmitter::new(api.clone(), naming.transform_name.clone()),
            poller: JobPoller::new(api.clone(), naming.transform_name.clone(), config.polling),
            fetcher: ResultFetcher::new(api.clone(), blobs, config.sas_expiry),
            delivery: DeliveryProvisioner::new(api.clone(), naming.streaming_endpoint_name.clone()),
            api,
            config,
        }
    }

    /// Run with freshly generated resource names
    pub async fn run(&self) -> Result<WorkflowOutcome, WorkflowError> {
        let names = RunNames::generate(&self.config.naming.name_prefix);
        self.run_with_names(&names).await
    }

    pub async fn run_with_names(&self, names: &RunNames) -> Result<WorkflowOutcome, WorkflowError> {
        let transform_name = self.config.naming.transform_name.as_str();
        info!(
            token = %names.token,
            transform_name = transform_name,
            "Starting encoding workflow"
        );

        ensure_transform(self.api.as_ref(), transform_name, ADAPTIVE_STREAMING_PRESET)
            .await
            .map_err(|source| WorkflowError::Provisioning {
                resource: format!("transform {}", transform_name),
                source,
            })?;

        let input = resolve_job_input(&self.config.input, &names.input_asset, &self.assets)
            .await
            .map_err(|source| WorkflowError::Provisioning {
                resource: format!("input asset {}", names.input_asset),
                source,
            })?;

        self.assets
            .create_output_asset(&names.output_asset)
            .await
            .map_err(|source| WorkflowError::Provisioning {
                resource: format!("output asset {}", names.output_asset),
                source,
            })?;

        self.submitter
            .submit(&names.job, input.input.clone(), &names.output_asset)
            .await
            .map_err(|source| WorkflowError::Submission {
                job_name: names.job.clone(),
                source,
            })?;

        let polled = self
            .poller
            .wait_for_job(&names.job)
            .await
            .map_err(|source| WorkflowError::Polling {
                job_name: names.job.clone(),
                source,
            })?;

        let job = match polled {
            PollOutcome::TimedOut(job) => {
                return Ok(WorkflowOutcome::TimedOut {
                    job_name: names.job.clone(),
                    last_state: job.state(),
                });
            }
            PollOutcome::Terminal(job) => job,
        };

        if let Some(outcome) = unfinished_outcome(&names.job, &job) {
            return Ok(outcome);
        }

        info!(job_name = names.job.as_str(), "Job finished");

        let downloads = self
            .fetcher
            .download_results(&names.output_asset, &self.config.output_folder)
            .await
            .map_err(|source| WorkflowError::Download {
                asset_name: names.output_asset.clone(),
                source,
            })?;

        let policy_name = self.config.naming.content_key_policy_name.as_str();
        self.delivery
            .ensure_content_key_policy(policy_name)
            .await
            .map_err(|source| delivery_error(format!("content key policy {}", policy_name), source))?;

        self.delivery
            .create_streaming_locator(&names.output_asset, &names.locator, policy_name)
            .await
            .map_err(|source| delivery_error(format!("streaming locator {}", names.locator), source))?;

        let streaming_urls = self
            .delivery
            .get_streaming_urls(&names.locator)
            .await
            .map_err(|source| delivery_error(format!("streaming URLs of {}", names.locator), source))?;

        let deleted_input_asset = self.clean_up(names, input.input_asset_name()).await?;

        Ok(WorkflowOutcome::Finished(WorkflowReport {
            job_name: names.job.clone(),
            output_asset: names.output_asset.clone(),
            locator_name: names.locator.clone(),
            streaming_urls,
            downloads,
            deleted_input_asset,
        }))
    }

    /// Delete the job and the uploaded input asset. The output asset is kept
    /// because the locator publishes it.
    async fn clean_up(
        &self,
        names: &RunNames,
        input_asset: Option<&str>,
    ) -> Result<Option<String>, WorkflowError> {
        info!(job_name = names.job.as_str(), "Cleaning up");

        self.api
            .delete_job(&self.config.naming.transform_name, &names.job)
            .await
            .map_err(|source| WorkflowError::Cleanup {
                resource: format!("job {}", names.job),
                source,
            })?;

        let Some(asset_name) = input_asset else {
            return Ok(None);
        };

        self.api
            .delete_asset(asset_name)
            .await
            .map_err(|source| WorkflowError::Cleanup {
                resource: format!("input asset {}", asset_name),
                source,
            })?;

        Ok(Some(asset_name.to_string()))
    }
}

fn delivery_error(resource: String, source: MediaServicesError) -> WorkflowError {
    WorkflowError::Delivery { resource, source }
}

/// Outcome for a polled job that did not finish; `None` when it finished
fn unfinished_outcome(job_name: &str, job: &Job) -> Option<WorkflowOutcome> {
    match job.state() {
        JobState::Finished => None,
        JobState::Canceled => {
            warn!(job_name = job_name, "Job was canceled");
            Some(WorkflowOutcome::Canceled {
                job_name: job_name.to_string(),
            })
        }
        JobState::Error => {
            let job_error = job.first_output_error().cloned();
            match &job_error {
                Some(detail) => error!(job_name = job_name, error = %detail, "Job failed"),
                None => error!(job_name = job_name, "Job failed without error detail"),
            }
            Some(WorkflowOutcome::JobFailed {
                job_name: job_name.to_string(),
                error: job_error,
            })
        }
        // Only terminal states leave the poller; anything else is unfinished
        state => {
            warn!(job_name = job_name, state = %state, "Job left polling in a non-terminal state");
            Some(WorkflowOutcome::TimedOut {
                job_name: job_name.to_string(),
                last_state: state,
            })
        }
    }
}
