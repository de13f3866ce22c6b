//! Container SAS issuance
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

use amsflow_types::{ContainerSasPermission, ContainerSasUrl};
use chrono::Utc;
use media_services_client::{MediaServicesApi, MediaServicesError, MediaServicesResult};
use std::time::Duration;
use tracing::debug;

/// Request a SAS URL for an asset's container, valid for `lifetime` from now,
/// and parse the first one the service returns.
pub async fn issue_container_sas(
    api: &dyn MediaServicesApi,
    asset_name: &str,
    permission: ContainerSasPermission,
    lifetime: Duration,
) -> MediaServicesResult<ContainerSasUrl> {
    let lifetime = chrono::Duration::from_std(lifetime)
        .map_err(|e| MediaServicesError::Configuration(format!("Invalid SAS lifetime: {}", e)))?;
    let expiry = Utc::now().checked_add_signed(lifetime).ok_or_else(|| {
        MediaServicesError::Configuration("SAS lifetime is out of range".to_string())
    })?;

    let urls = api.list_container_sas(asset_name, permission, expiry).await?;
    let first = urls.first().ok_or_else(|| {
        MediaServicesError::InvalidResponse(format!(
            "No container SAS URL issued for asset {}",
            asset_name
        ))
    })?;

    let sas = ContainerSasUrl::parse(first)?;
    debug!(
        asset_name = asset_name,
        container = sas.container(),
        permission = ?permission,
        expires_at = %expiry,
        "Container SAS issued"
    );
    Ok(sas)
}
