//! Management API client
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
use amsflow_types::{
    Asset, AssetContainerSas, AssetProperties, ContainerSasPermission, ContentKeyPolicy,
    ContentKeyPolicySpec, Job, JobProperties, ListContainerSasInput, ListPathsResponse, Resource,
    StreamingEndpoint, StreamingLocator, StreamingLocatorSpec, Transform, TransformSpec,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{AccessToken, ServicePrincipalCredential};
use crate::error::{MediaServicesError, MediaServicesResult};
use crate::traits::MediaServicesApi;

pub const API_VERSION: &str = "2021-06-01";

#[derive(Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorBody,
}

#[derive(Deserialize)]
struct ArmErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Client for one media services account
pub struct ArmClient {
    http: reqwest::Client,
    account_url: String,
    token: AccessToken,
}

impl ArmClient {
    /// Authenticate with the configured service principal and return a
    /// client bound to the configured account
    pub async fn connect(config: &WorkflowConfig) -> MediaServicesResult<Self> {
        let http = crate::build_http_client(config.http_timeout)?;
        let token = ServicePrincipalCredential::from_config(config)
            .acquire_token(&http)
            .await?;

        Ok(Self::with_token(http, config.account_url(), token))
    }

    pub fn with_token(http: reqwest::Client, account_url: impl Into<String>, token: AccessToken) -> Self {
        Self {
            http,
            account_url: account_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.account_url, path, API_VERSION)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> MediaServicesResult<reqwest::Response> {
        if self.token.is_expired() {
            return Err(MediaServicesError::Authentication(
                "Management API token has expired".to_string(),
            ));
        }

        let url = self.url(path);
        debug!(method = %method, url = url, "Management API request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(self.token.secret());
        if let Some(body) = body {
            request = request.json(&body);
        }

        Ok(request.send().await?)
    }

    async fn into_error(response: reqwest::Response) -> MediaServicesError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ArmErrorResponse>(&body) {
            Ok(parsed) => MediaServicesError::Api {
                status: status.as_u16(),
                code: parsed.error.code,
                message: parsed.error.message,
            },
            Err(_) => MediaServicesError::Api {
                status: status.as_u16(),
                code: status.canonical_reason().unwrap_or("Unknown").to_string(),
                message: body,
            },
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> MediaServicesResult<T> {
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            MediaServicesError::InvalidResponse(format!("{} (body: {})", e, String::from_utf8_lossy(&bytes)))
        })
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> MediaServicesResult<Option<T>> {
        let response = self.send(Method::GET, path, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse(response).await.map(Some)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> MediaServicesResult<T> {
        let response = self.send(Method::GET, path, None).await?;
        Self::parse(response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> MediaServicesResult<T> {
        let response = self
            .send(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await?;
        Self::parse(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: Option<&B>) -> MediaServicesResult<T> {
        let body = body.map(serde_json::to_value).transpose()?;
        let response = self.send(Method::POST, path, body).await?;
        Self::parse(response).await
    }

    async fn delete(&self, path: &str) -> MediaServicesResult<()> {
        let response = self.send(Method::DELETE, path, None).await?;
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PropertiesBody<'a, P> {
    properties: &'a P,
}

#[async_trait]
impl MediaServicesApi for ArmClient {
    async fn get_transform(&self, name: &str) -> MediaServicesResult<Option<Transform>> {
        self.get_optional(&format!("transforms/{}", name)).await
    }

    async fn create_or_update_transform(
        &self,
        name: &str,
        spec: &TransformSpec,
    ) -> MediaServicesResult<Transform> {
        self.put(&format!("transforms/{}", name), &PropertiesBody { properties: spec })
            .await
    }

    async fn get_content_key_policy(&self, name: &str) -> MediaServicesResult<Option<ContentKeyPolicy>> {
        self.get_optional(&format!("contentKeyPolicies/{}", name)).await
    }

    async fn create_or_update_content_key_policy(
        &self,
        name: &str,
        spec: &ContentKeyPolicySpec,
    ) -> MediaServicesResult<ContentKeyPolicy> {
        self.put(
            &format!("contentKeyPolicies/{}", name),
            &PropertiesBody { properties: spec },
        )
        .await
    }

    async fn create_or_update_asset(&self, name: &str) -> MediaServicesResult<Asset> {
        let empty = AssetProperties::default();
        let asset: Resource<AssetProperties> = self
            .put(&format!("assets/{}", name), &PropertiesBody { properties: &empty })
            .await?;
        Ok(asset)
    }

    async fn list_container_sas(
        &self,
        asset_name: &str,
        permissions: ContainerSasPermission,
        expiry_time: DateTime<Utc>,
    ) -> MediaServicesResult<Vec<String>> {
        let input = ListContainerSasInput {
            permissions,
            expiry_time,
        };
        let sas: AssetContainerSas = self
            .post(&format!("assets/{}/listContainerSas", asset_name), Some(&input))
            .await?;
        Ok(sas.asset_container_sas_urls)
    }

    async fn delete_asset(&self, name: &str) -> MediaServicesResult<()> {
        self.delete(&format!("assets/{}", name)).await
    }

    async fn create_job(
        &self,
        transform_name: &str,
        job_name: &str,
        properties: &JobProperties,
    ) -> MediaServicesResult<Job> {
        self.put(
            &format!("transforms/{}/jobs/{}", transform_name, job_name),
            &PropertiesBody { properties },
        )
        .await
    }

    async fn get_job(&self, transform_name: &str, job_name: &str) -> MediaServicesResult<Job> {
        self.get(&format!("transforms/{}/jobs/{}", transform_name, job_name))
            .await
    }

    async fn delete_job(&self, transform_name: &str, job_name: &str) -> MediaServicesResult<()> {
        self.delete(&format!("transforms/{}/jobs/{}", transform_name, job_name))
            .await
    }

    async fn create_streaming_locator(
        &self,
        name: &str,
        spec: &StreamingLocatorSpec,
    ) -> MediaServicesResult<StreamingLocator> {
        self.put(
            &format!("streamingLocators/{}", name),
            &PropertiesBody { properties: spec },
        )
        .await
    }

    async fn list_streaming_paths(&self, locator_name: &str) -> MediaServicesResult<ListPathsResponse> {
        self.post::<(), _>(&format!("streamingLocators/{}/listPaths", locator_name), None)
            .await
    }

    async fn get_streaming_endpoint(&self, name: &str) -> MediaServicesResult<StreamingEndpoint> {
        self.get(&format!("streamingEndpoints/{}", name)).await
    }
}
