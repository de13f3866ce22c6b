//! Input and output asset provisioning
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

use amsflow_types::{Asset, ContainerSasPermission};
use media_services_client::{BlobStorage, MediaServicesApi, MediaServicesError, MediaServicesResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::naming::upload_blob_name;
use crate::sas::issue_container_sas;

/// Input asset populated from a local file
#[derive(Debug, Clone)]
pub struct UploadedInput {
    pub asset: Asset,
    pub blob_name: String,
    pub size: u64,
}

/// Creates assets and fills input assets from local files
pub struct AssetProvisioner {
    api: Arc<dyn MediaServicesApi>,
    blobs: Arc<dyn BlobStorage>,
    sas_lifetime: Duration,
}

impl AssetProvisioner {
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

    /// Create the empty asset the job writes its output into
    pub async fn create_output_asset(&self, name: &str) -> MediaServicesResult<Asset> {
        info!(asset_name = name, "Creating output asset");
        self.api.create_or_update_asset(name).await
    }

    /// Create an input asset and upload `source` into its container as a
    /// single block blob.
    ///
    /// The file is checked before anything is created remotely, so a missing
    /// file leaves no asset behind.
    pub async fn create_input_asset(
        &self,
        name: &str,
        source: &Path,
    ) -> MediaServicesResult<UploadedInput> {
        let metadata = tokio::fs::metadata(source).await?;
        if !metadata.is_file() {
            return Err(MediaServicesError::Configuration(format!(
                "Input {} is not a file",
                source.display()
            )));
        }
        let blob_name = upload_blob_name(source).ok_or_else(|| {
            MediaServicesError::Configuration(format!(
                "Input {} has no file name",
                source.display()
            ))
        })?;

        info!(asset_name = name, source = %source.display(), "Creating input asset");
        let asset = self.api.create_or_update_asset(name).await?;

        let container = issue_container_sas(
            self.api.as_ref(),
            name,
            ContainerSasPermission::ReadWrite,
            self.sas_lifetime,
        )
        .await?;

        let size = self.blobs.upload_file(&container, &blob_name, source).await?;
        info!(
            asset_name = name,
            blob_name = blob_name,
            size = size,
            "Input file uploaded"
        );

        Ok(UploadedInput {
            asset,
            blob_name,
            size,
        })
    }
}
