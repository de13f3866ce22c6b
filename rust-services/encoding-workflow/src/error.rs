//! Workflow error types
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


use media_services_client::MediaServicesError;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

/// Pipeline failure, tagged with the stage that failed.
///
/// Job-level failures (a job ending in `Error` or `Canceled`) are not
/// errors; they are reported through `WorkflowOutcome`.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Could not connect to Media Services: {0}")]
    Authentication(#[source] MediaServicesError),

    #[error("Failed to provision {resource}: {source}")]
    Provisioning {
        resource: String,
        #[source]
        source: MediaServicesError,
    },

    #[error("Failed to submit job {job_name}: {source}")]
    Submission {
        job_name: String,
        #[source]
        source: MediaServicesError,
    },

    #[error("Failed to poll job {job_name}: {source}")]
    Polling {
        job_name: String,
        #[source]
        source: MediaServicesError,
    },

    #[error("Failed to download results of asset {asset_name}: {source}")]
    Download {
        asset_name: String,
        #[source]
        source: DownloadError,
    },

    #[error("Failed to provision streaming delivery ({resource}): {source}")]
    Delivery {
        resource: String,
        #[source]
        source: MediaServicesError,
    },

    #[error("Failed to clean up {resource}: {source}")]
    Cleanup {
        resource: String,
        #[source]
        source: MediaServicesError,
    },
}

impl WorkflowError {
    /// Short name of the failed stage, for logs
    pub fn stage(&self) -> &'static str {
        match self {
            WorkflowError::Authentication(_) => "authentication",
            WorkflowError::Provisioning { .. } => "provisioning",
            WorkflowError::Submission { .. } => "submission",
            WorkflowError::Polling { .. } => "polling",
            WorkflowError::Download { .. } => "download",
            WorkflowError::Delivery { .. } => "delivery",
            WorkflowError::Cleanup { .. } => "cleanup",
        }
    }
}

/// Result download failure
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(transparent)]
    Remote(#[from] MediaServicesError),

    #[error("Failed to create directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} of {attempted} blob downloads failed", .failed.len())]
    Incomplete {
        attempted: usize,
        failed: Vec<BlobDownloadFailure>,
    },
}

/// One blob that did not make it to disk
#[derive(Debug)]
pub struct BlobDownloadFailure {
    pub blob_name: String,
    pub error: BlobTransferError,
}

#[derive(Error, Debug)]
pub enum BlobTransferError {
    #[error(transparent)]
    Remote(#[from] MediaServicesError),

    #[error("Download task failed: {0}")]
    Task(#[from] JoinError),

    /// Absolute, rooted or `..` names would land outside the asset directory
    #[error("Blob name does not resolve under the output directory")]
    UnsafeName,
}
