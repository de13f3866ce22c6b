//! Asset container storage client (SAS-authorized)
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


use amsflow_types::{BlobItem, BlobType, ContainerSasUrl};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaServicesError, MediaServicesResult};
use crate::traits::BlobStorage;

pub const STORAGE_API_VERSION: &str = "2020-10-02";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResults {
    #[serde(default)]
    blobs: BlobList,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BlobList {
    #[serde(rename = "Blob", default)]
    blobs: Vec<BlobEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobEntry {
    name: String,
    properties: BlobEntryProperties,
}

#[derive(Debug, Deserialize)]
struct BlobEntryProperties {
    #[serde(rename = "Content-Length", default)]
    content_length: Option<u64>,
    #[serde(rename = "BlobType")]
    blob_type: BlobType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Parse one page of a container listing into blob items and the
/// continuation marker, if any
fn parse_listing(xml: &str) -> MediaServicesResult<(Vec<BlobItem>, Option<String>)> {
    let results: EnumerationResults = quick_xml::de::from_str(xml)?;

    let items = results
        .blobs
        .blobs
        .into_iter()
        .map(|entry| BlobItem {
            name: entry.name,
            blob_type: entry.properties.blob_type,
            content_length: entry.properties.content_length,
        })
        .collect();

    let marker = results
        .next_marker
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    Ok((items, marker))
}

/// Blob client that needs nothing but the container SAS URL
#[derive(Clone)]
pub struct SasBlobClient {
    http: reqwest::Client,
}

impl SasBlobClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn check(response: reqwest::Response) -> MediaServicesResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match quick_xml::de::from_str::<StorageErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.message.trim().to_string()),
            Err(_) => (
                status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            ),
        };

        Err(MediaServicesError::Storage {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl BlobStorage for SasBlobClient {
    async fn list_blobs(&self, container: &ContainerSasUrl) -> MediaServicesResult<Vec<BlobItem>> {
        let mut blobs = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .http
                .get(container.list_url(marker.as_deref()))
                .header("x-ms-version", STORAGE_API_VERSION)
                .send()
                .await?;
            let body = Self::check(response).await?.text().await?;

            let (page, next) = parse_listing(&body)?;
            debug!(
                container = container.container(),
                page_size = page.len(),
                "Listed blob page"
            );
            blobs.extend(page);

            match next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(blobs)
    }

    async fn upload_file(
        &self,
        container: &ContainerSasUrl,
        blob_name: &str,
        source: &Path,
    ) -> MediaServicesResult<u64> {
        let file = File::open(source).await?;
        let size = file.metadata().await?.len();

        info!(
            container = container.container(),
            blob_name = blob_name,
            source = %source.display(),
            size = size,
            "Uploading block blob"
        );

        let response = self
            .http
            .put(container.blob_url(blob_name))
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(reqwest::Body::from(file))
            .send()
            .await?;
        Self::check(response).await?;

        Ok(size)
    }

    async fn download_to_file(
        &self,
        container: &ContainerSasUrl,
        blob_name: &str,
        destination: &Path,
    ) -> MediaServicesResult<u64> {
        let response = self
            .http
            .get(container.blob_url(blob_name))
            .header("x-ms-version", STORAGE_API_VERSION)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut file = File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut total_bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            total_bytes += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(
            blob_name = blob_name,
            size = total_bytes,
            destination = %destination.display(),
            "Blob downloaded"
        );

        Ok(total_bytes)
    }
}
