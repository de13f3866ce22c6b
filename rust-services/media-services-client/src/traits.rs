//! Trait definitions for the remote surfaces
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


use amsflow_types::{
    Asset, BlobItem, ContainerSasPermission, ContainerSasUrl, ContentKeyPolicy,
    ContentKeyPolicySpec, Job, JobProperties, ListPathsResponse, StreamingEndpoint,
    StreamingLocator, StreamingLocatorSpec, Transform, TransformSpec,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::error::MediaServicesResult;

/// Management operations of one media services account
///
/// `get_*` lookups return `Ok(None)` for a missing resource instead of an
/// error.
#[async_trait]
pub trait MediaServicesApi: Send + Sync {
    async fn get_transform(&self, name: &str) -> MediaServicesResult<Option<Transform>>;

    async fn create_or_update_transform(
        &self,
        name: &str,
        spec: &TransformSpec,
    ) -> MediaServicesResult<Transform>;

    async fn get_content_key_policy(&self, name: &str) -> MediaServicesResult<Option<ContentKeyPolicy>>;

    async fn create_or_update_content_key_policy(
        &self,
        name: &str,
        spec: &ContentKeyPolicySpec,
    ) -> MediaServicesResult<ContentKeyPolicy>;

    /// Create (or overwrite) an empty asset
    async fn create_or_update_asset(&self, name: &str) -> MediaServicesResult<Asset>;

    /// Issue SAS URLs for the asset's storage container
    async fn list_container_sas(
        &self,
        asset_name: &str,
        permissions: ContainerSasPermission,
        expiry_time: DateTime<Utc>,
    ) -> MediaServicesResult<Vec<String>>;

    async fn delete_asset(&self, name: &str) -> MediaServicesResult<()>;

    async fn create_job(
        &self,
        transform_name: &str,
        job_name: &str,
        properties: &JobProperties,
    ) -> MediaServicesResult<Job>;

    async fn get_job(&self, transform_name: &str, job_name: &str) -> MediaServicesResult<Job>;

    async fn delete_job(&self, transform_name: &str, job_name: &str) -> MediaServicesResult<()>;

    async fn create_streaming_locator(
        &self,
        name: &str,
        spec: &StreamingLocatorSpec,
    ) -> MediaServicesResult<StreamingLocator>;

    async fn list_streaming_paths(&self, locator_name: &str) -> MediaServicesResult<ListPathsResponse>;

    async fn get_streaming_endpoint(&self, name: &str) -> MediaServicesResult<StreamingEndpoint>;
}

/// Blob operations on an asset container, authorized by its SAS URL only
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Every blob in the container, across all listing pages
    async fn list_blobs(&self, container: &ContainerSasUrl) -> MediaServicesResult<Vec<BlobItem>>;

    /// Upload a local file as one block blob; returns the uploaded size
    async fn upload_file(
        &self,
        container: &ContainerSasUrl,
        blob_name: &str,
        source: &Path,
    ) -> MediaServicesResult<u64>;

    /// Download one blob to a local file; returns the downloaded size
    async fn download_to_file(
        &self,
        container: &ContainerSasUrl,
        blob_name: &str,
        destination: &Path,
    ) -> MediaServicesResult<u64>;
}
