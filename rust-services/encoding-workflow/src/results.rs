//! Output asset download
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

use amsflow_types::{BlobType, ContainerSasPermission, ContainerSasUrl};
use media_services_client::{BlobStorage, MediaServicesApi, MediaServicesResult};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{BlobDownloadFailure, BlobTransferError, DownloadError};
use crate::sas::issue_container_sas;

/// What landed on disk
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    /// `<output folder>/<asset name>`
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
    pub total_bytes: u64,
    /// Page and append blobs, which are not downloaded
    pub skipped: usize,
}

/// Downloads every block blob of an output asset
pub struct ResultFetcher {
    api: Arc<dyn MediaServicesApi>,
    blobs: Arc<dyn BlobStorage>,
    sas_lifetime: Duration,
}

impl ResultFetcher {
    pub fn new(
        api: Arc<dyn MediaServicesApi>,
        blobs: Arc<dyn BlobStorage>,
        sas_lifetime: Duration,
    ) -> Self {
        Self {
            api,
            blobs,
            sas_lifetime,
        }
    }

    /// Download the asset's block blobs into `output_folder/asset_name/`.
    ///
    /// Blobs are fetched concurrently and all transfers are joined before
    /// returning. Any failed transfer makes the whole download fail with
    /// every failure listed.
    pub async fn download_results(
        &self,
        asset_name: &str,
        output_folder: &Path,
    ) -> Result<DownloadSummary, DownloadError> {
        let container = issue_container_sas(
            self.api.as_ref(),
            asset_name,
            ContainerSasPermission::Read,
            self.sas_lifetime,
        )
        .await?;

        let directory = output_folder.join(asset_name);
        create_directory(&directory).await?;

        let listing = self.blobs.list_blobs(&container).await?;
        let total = listing.len();
        let (block_blobs, others): (Vec<_>, Vec<_>) = listing
            .into_iter()
            .partition(|blob| blob.blob_type == BlobType::BlockBlob);

        for blob in &others {
            debug!(blob_name = blob.name.as_str(), blob_type = ?blob.blob_type, "Skipping non-block blob");
        }

        info!(
            asset_name = asset_name,
            directory = %directory.display(),
            blobs = total,
            block_blobs = block_blobs.len(),
            "Downloading output asset"
        );

        let attempted = block_blobs.len();
        let mut failed = Vec::new();
        let mut transfers = Vec::with_capacity(block_blobs.len());
        for blob in block_blobs {
            if !is_relative_blob_path(&blob.name) {
                let error = BlobTransferError::UnsafeName;
                warn!(blob_name = blob.name.as_str(), error = %error, "Blob download refused");
                failed.push(BlobDownloadFailure {
                    blob_name: blob.name,
                    error,
                });
                continue;
            }
            let storage = Arc::clone(&self.blobs);
            let container = container.clone();
            let destination = directory.join(&blob.name);
            let handle = tokio::spawn(fetch_blob(
                storage,
                container,
                blob.name.clone(),
                destination.clone(),
            ));
            transfers.push((blob.name, destination, handle));
        }

        let mut summary = DownloadSummary {
            directory,
            skipped: others.len(),
            ..Default::default()
        };

        for (blob_name, destination, handle) in transfers {
            let error = match handle.await {
                Ok(Ok(bytes)) => {
                    summary.total_bytes += bytes;
                    summary.files.push(destination);
                    continue;
                }
                Ok(Err(e)) => BlobTransferError::Remote(e),
                Err(e) => BlobTransferError::Task(e),
            };
            warn!(blob_name = blob_name.as_str(), error = %error, "Blob download failed");
            failed.push(BlobDownloadFailure { blob_name, error });
        }

        if !failed.is_empty() {
            return Err(DownloadError::Incomplete { attempted, failed });
        }

        info!(
            asset_name = asset_name,
            files = summary.files.len(),
            total_bytes = summary.total_bytes,
            "Output asset downloaded"
        );
        Ok(summary)
    }
}

/// A blob name made only of plain segments, so joining it stays inside the
/// directory it is joined onto
fn is_relative_blob_path(name: &str) -> bool {
    let path = Path::new(name);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

async fn fetch_blob(
    storage: Arc<dyn BlobStorage>,
    container: ContainerSasUrl,
    blob_name: String,
    destination: PathBuf,
) -> MediaServicesResult<u64> {
    // Blob names may carry virtual directories
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    storage
        .download_to_file(&container, &blob_name, &destination)
        .await
}

/// Create the destination directory; an existing one is reused
async fn create_directory(directory: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|source| DownloadError::Directory {
            path: directory.to_path_buf(),
            source,
        })
}
