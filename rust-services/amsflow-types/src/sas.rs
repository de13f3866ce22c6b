//! Asset container SAS URLs
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


use std::fmt;
use url::Url;

use crate::error::{AmsflowError, Result};

/// A container SAS URL split into the pieces the blob client needs:
/// `scheme://host/container?token`.
///
/// The token is the only credential; nothing else is needed to reach the
/// container.
#[derive(Clone, PartialEq, Eq)]
pub struct ContainerSasUrl {
    scheme: String,
    host: String,
    container: String,
    token: String,
}

impl ContainerSasUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| AmsflowError::InvalidSasUrl(e.to_string()))?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(AmsflowError::InvalidSasUrl("URL has no host".to_string()));
            }
        };

        let container = url.path().trim_start_matches('/').trim_end_matches('/');
        if container.is_empty() {
            return Err(AmsflowError::InvalidSasUrl(
                "URL has no container path".to_string(),
            ));
        }

        let token = url
            .query()
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AmsflowError::InvalidSasUrl("URL has no SAS token".to_string()))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            container: container.to_string(),
            token: token.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `scheme://host/container`, without the token
    pub fn container_url(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.host, self.container)
    }

    /// Authorized URL of a single blob in the container
    pub fn blob_url(&self, blob_name: &str) -> String {
        format!("{}/{}?{}", self.container_url(), blob_name, self.token)
    }

    /// Authorized URL of the container listing, optionally resuming at `marker`
    pub fn list_url(&self, marker: Option<&str>) -> String {
        let mut url = format!(
            "{}?restype=container&comp=list&{}",
            self.container_url(),
            self.token
        );
        if let Some(marker) = marker {
            url.push_str("&marker=");
            url.extend(url::form_urlencoded::byte_serialize(marker.as_bytes()));
        }
        url
    }
}

// The token is a bearer credential; keep it out of logs.
impl fmt::Debug for ContainerSasUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerSasUrl")
            .field("host", &self.host)
            .field("container", &self.container)
            .field("token", &"<redacted>")
            .finish()
    }
}
