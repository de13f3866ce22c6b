//! Media Services Client
//!
//! Thin clients for the two remote surfaces the encoding workflow talks to:
//! - the management API (transforms, assets, jobs, content key policies,
//!   streaming locators and endpoints), authenticated with a service
//!   principal bearer token
//! - asset container storage, authorized purely by container SAS URLs
//!
//! Both are exposed behind traits so the workflow can run against fakes.
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


pub mod arm;
pub mod auth;
pub mod blob;
pub mod error;
pub mod traits;

pub use arm::ArmClient;
pub use auth::{AccessToken, ServicePrincipalCredential};
pub use blob::SasBlobClient;
pub use error::{MediaServicesError, MediaServicesResult};
pub use traits::{BlobStorage, MediaServicesApi};

/// Build the shared HTTP client. Requests are never retried.
pub fn build_http_client(timeout: std::time::Duration) -> MediaServicesResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MediaServicesError::Configuration(format!("Failed to create HTTP client: {}", e)))
}
