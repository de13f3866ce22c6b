//! Bounded job polling

use amsflow_config::PollingConfig;
use amsflow_types::Job;
use media_services_client::{MediaServicesApi, MediaServicesError, MediaServicesResult};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// How polling ended
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The job reached Finished, Error or Canceled
    Terminal(Job),
    /// The deadline passed first; carries the last observed job
    TimedOut(Job),
}

impl PollOutcome {
    pub fn job(&self) -> &Job {
        match self {
            PollOutcome::Terminal(job) | PollOutcome::TimedOut(job) => job,
        }
    }

    pub fn into_job(self) -> Job {
        match self {
            PollOutcome::Terminal(job) | PollOutcome::TimedOut(job) => job,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, PollOutcome::TimedOut(_))
    }
}

/// Polls a job until it is terminal or the deadline passes
pub struct JobPoller {
    api: Arc<dyn MediaServicesApi>,
    transform_name: String,
    polling: PollingConfig,
}

impl JobPoller {
    pub fn new(
        api: Arc<dyn MediaServicesApi>,
        transform_name: impl Into<String>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            api,
            transform_name: transform_name.into(),
            polling,
        }
    }

    /// Fetch the job every `interval` until it is terminal or `timeout` has
    /// elapsed since the call. Returns within roughly timeout + interval.
    pub async fn wait_for_job(&self, job_name: &str) -> MediaServicesResult<PollOutcome> {
        let deadline = Instant::now()
            .checked_add(self.polling.timeout)
            .ok_or_else(|| {
                MediaServicesError::Configuration(format!(
                    "Job timeout of {}s is out of range",
                    self.polling.timeout.as_secs()
                ))
            })?;

        loop {
            let job = self.api.get_job(&self.transform_name, job_name).await?;
            let state = job.state();
            info!(job_name = job_name, state = %state, "Job status");

            if state.is_terminal() {
                return Ok(PollOutcome::Terminal(job));
            }

            if Instant::now() >= deadline {
                warn!(
                    job_name = job_name,
                    state = %state,
                    timeout_secs = self.polling.timeout.as_secs(),
                    "Job did not reach a terminal state before the deadline"
                );
                return Ok(PollOutcome::TimedOut(job));
            }

            sleep(self.polling.interval).await;
        }
    }
}
