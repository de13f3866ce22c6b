//! Job input resolution and submission
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

use amsflow_config::JobInputSource;
use amsflow_types::{Job, JobInput, JobProperties};
use media_services_client::{MediaServicesApi, MediaServicesResult};
use std::sync::Arc;
use tracing::info;

use crate::assets::{AssetProvisioner, UploadedInput};

/// Job input plus the asset uploaded for it, if one was
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub input: JobInput,
    pub uploaded: Option<UploadedInput>,
}

impl ResolvedInput {
    /// Name of the input asset created for this run
    pub fn input_asset_name(&self) -> Option<&str> {
        self.uploaded.as_ref().map(|u| u.asset.name.as_str())
    }
}

/// Turn the configured input into a job input.
///
/// A local file is uploaded into a new asset named `input_asset_name`; a
/// URL is referenced directly and nothing is uploaded.
pub async fn resolve_job_input(
    source: &JobInputSource,
    input_asset_name: &str,
    assets: &AssetProvisioner,
) -> MediaServicesResult<ResolvedInput> {
    match source {
        JobInputSource::File(path) => {
            let uploaded = assets.create_input_asset(input_asset_name, path).await?;
            Ok(ResolvedInput {
                input: JobInput::asset(uploaded.asset.name.clone()),
                uploaded: Some(uploaded),
            })
        }
        JobInputSource::Url(url) => {
            info!(url = url.as_str(), "Using remote job input");
            Ok(ResolvedInput {
                input: JobInput::http_url(url.clone()),
                uploaded: None,
            })
        }
    }
}

/// Submits encoding jobs under one transform
pub struct JobSubmitter {
    api: Arc<dyn MediaServicesApi>,
    transform_name: String,
}

impl JobSubmitter {
    pub fn new(api: Arc<dyn MediaServicesApi>, transform_name: impl Into<String>) -> Self {
        Self {
            api,
            transform_name: transform_name.into(),
        }
    }

    /// Submit a job reading `input` and writing into `output_asset_name`
    pub async fn submit(
        &self,
        job_name: &str,
        input: JobInput,
        output_asset_name: &str,
    ) -> MediaServicesResult<Job> {
        info!(
            transform_name = self.transform_name.as_str(),
            job_name = job_name,
            output_asset = output_asset_name,
            "Submitting job"
        );

        let properties = JobProperties::new(input, output_asset_name);
        self.api
            .create_job(&self.transform_name, job_name, &properties)
            .await
    }
}
