//! Job resource definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resources::Resource;

pub type Job = Resource<JobProperties>;

/// Server-owned job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Scheduled,
    Processing,
    Canceling,
    Canceled,
    Error,
    Finished,
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// Finished, Error and Canceled end polling; everything else is pending.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished | JobState::Error | JobState::Canceled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Queued => "Queued",
            JobState::Scheduled => "Scheduled",
            JobState::Processing => "Processing",
            JobState::Canceling => "Canceling",
            JobState::Canceled => "Canceled",
            JobState::Error => "Error",
            JobState::Finished => "Finished",
            JobState::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// What the job encodes: an uploaded asset or a list of HTTP(S) URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum JobInput {
    #[serde(rename = "#Microsoft.Media.JobInputAsset", rename_all = "camelCase")]
    Asset { asset_name: String },

    #[serde(rename = "#Microsoft.Media.JobInputHttp", rename_all = "camelCase")]
    Http {
        files: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_uri: Option<String>,
    },
}

impl JobInput {
    pub fn asset(asset_name: impl Into<String>) -> Self {
        JobInput::Asset {
            asset_name: asset_name.into(),
        }
    }

    pub fn http_url(url: impl Into<String>) -> Self {
        JobInput::Http {
            files: vec![url.into()],
            base_uri: None,
        }
    }

    /// Name of the input asset, if the job reads from one
    pub fn asset_name(&self) -> Option<&str> {
        match self {
            JobInput::Asset { asset_name } => Some(asset_name),
            JobInput::Http { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum JobOutput {
    #[serde(rename = "#Microsoft.Media.JobOutputAsset", rename_all = "camelCase")]
    Asset {
        asset_name: String,
        #[serde(default, skip_serializing)]
        state: Option<JobState>,
        #[serde(default, skip_serializing)]
        progress: Option<u8>,
        #[serde(default, skip_serializing)]
        error: Option<JobError>,
    },
}

impl JobOutput {
    pub fn asset(asset_name: impl Into<String>) -> Self {
        JobOutput::Asset {
            asset_name: asset_name.into(),
            state: None,
            progress: None,
            error: None,
        }
    }

    pub fn asset_name(&self) -> &str {
        match self {
            JobOutput::Asset { asset_name, .. } => asset_name,
        }
    }

    pub fn error(&self) -> Option<&JobError> {
        match self {
            JobOutput::Asset { error, .. } => error.as_ref(),
        }
    }
}

/// Error reported by the service on a failed job output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub retry: Option<String>,
    #[serde(default)]
    pub details: Vec<JobErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(category) = &self.category {
            write!(f, " (category: {})", category)?;
        }
        for detail in &self.details {
            write!(f, "; {}: {}", detail.code, detail.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProperties {
    pub input: JobInput,
    pub outputs: Vec<JobOutput>,
    #[serde(default, skip_serializing)]
    pub state: Option<JobState>,
    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl JobProperties {
    /// Job body as submitted: one input, one output asset
    pub fn new(input: JobInput, output_asset_name: impl Into<String>) -> Self {
        Self {
            input,
            outputs: vec![JobOutput::asset(output_asset_name)],
            state: None,
            created: None,
            last_modified: None,
        }
    }
}

impl Resource<JobProperties> {
    /// Current state; a job the service has not reported on yet is queued.
    pub fn state(&self) -> JobState {
        self.properties.state.unwrap_or(JobState::Queued)
    }

    /// Error detail of the first output, if any
    pub fn first_output_error(&self) -> Option<&JobError> {
        self.properties.outputs.first().and_then(JobOutput::error)
    }
}
