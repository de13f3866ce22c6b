//! DRM-protected streaming delivery
//!
//! Ensures the multi-DRM content key policy, publishes an output asset
//! through a streaming locator and resolves the playback URLs.
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
    ContentKeyPolicy, ContentKeyPolicyConfiguration, ContentKeyPolicyOption,
    ContentKeyPolicyRestriction, ContentKeyPolicySpec, PlayReadyContentKeyLocation,
    PlayReadyContentType, PlayReadyLicense, PlayReadyLicenseType, PlayReadyPlayRight,
    StreamingEndpointState, StreamingLocator, StreamingLocatorSpec, StreamingPath,
    UnknownOutputPassingOption,
};
use media_services_client::{MediaServicesApi, MediaServicesResult};
use std::sync::Arc;
use tracing::{info, warn};

use crate::ensure::ensure;

/// Predefined streaming policy for PlayReady + Widevine common encryption
pub const MULTI_DRM_STREAMING_POLICY: &str = "Predefined_MultiDrmCencStreaming";

const POLICY_DESCRIPTION: &str = "Content Key Policy Description";
const WIDEVINE_OPTION_NAME: &str = "CommonEncryptionWidevineOpenOption";
const PLAYREADY_OPTION_NAME: &str = "CommonEncryptionPlayReadyOpenOption";

/// Content key policy with a Widevine and a PlayReady option, both open
/// (licenses are issued without token checks).
pub fn multi_drm_open_policy() -> ContentKeyPolicySpec {
    let playready_license = PlayReadyLicense {
        allow_test_devices: false,
        play_right: Some(PlayReadyPlayRight {
            digital_video_only_content_restriction: false,
            image_constraint_for_analog_component_video_restriction: false,
            image_constraint_for_analog_computer_monitor_restriction: false,
            allow_passing_video_content_to_unknown_output: UnknownOutputPassingOption::NotAllowed,
        }),
        license_type: PlayReadyLicenseType::NonPersistent,
        content_key_location: PlayReadyContentKeyLocation::FromHeader,
        content_type: PlayReadyContentType::UltraVioletStreaming,
    };

    ContentKeyPolicySpec {
        description: Some(POLICY_DESCRIPTION.to_string()),
        options: vec![
            ContentKeyPolicyOption {
                policy_option_id: None,
                name: WIDEVINE_OPTION_NAME.to_string(),
                configuration: ContentKeyPolicyConfiguration::Widevine {
                    widevine_template: "{}".to_string(),
                },
                restriction: ContentKeyPolicyRestriction::Open,
            },
            ContentKeyPolicyOption {
                policy_option_id: None,
                name: PLAYREADY_OPTION_NAME.to_string(),
                configuration: ContentKeyPolicyConfiguration::PlayReady {
                    licenses: vec![playready_license],
                    response_custom_data: None,
                },
                restriction: ContentKeyPolicyRestriction::Open,
            },
        ],
    }
}

/// Playback URLs: `https://{host}/{path}` using the first path of each
/// protocol entry. Entries without paths are skipped.
pub fn streaming_urls(host_name: &str, streaming_paths: &[StreamingPath]) -> Vec<String> {
    streaming_paths
        .iter()
        .filter_map(|entry| entry.paths.first())
        .map(|path| format!("https://{}/{}", host_name, path.trim_start_matches('/')))
        .collect()
}

/// Provisions the content key policy and streaming locators of a run
pub struct DeliveryProvisioner {
    api: Arc<dyn MediaServicesApi>,
    streaming_endpoint_name: String,
}

impl DeliveryProvisioner {
    pub fn new(api: Arc<dyn MediaServicesApi>, streaming_endpoint_name: impl Into<String>) -> Self {
        Self {
            api,
            streaming_endpoint_name: streaming_endpoint_name.into(),
        }
    }

    /// Get the named policy, creating the multi-DRM open policy if absent
    pub async fn ensure_content_key_policy(&self, name: &str) -> MediaServicesResult<ContentKeyPolicy> {
        ensure::<ContentKeyPolicy>(self.api.as_ref(), name, &multi_drm_open_policy()).await
    }

    /// Publish `asset_name` under the multi-DRM streaming policy
    pub async fn create_streaming_locator(
        &self,
        asset_name: &str,
        locator_name: &str,
        content_key_policy_name: &str,
    ) -> MediaServicesResult<StreamingLocator> {
        info!(
            locator_name = locator_name,
            asset_name = asset_name,
            content_key_policy = content_key_policy_name,
            "Creating streaming locator"
        );

        let spec = StreamingLocatorSpec {
            asset_name: asset_name.to_string(),
            streaming_policy_name: MULTI_DRM_STREAMING_POLICY.to_string(),
            default_content_key_policy_name: Some(content_key_policy_name.to_string()),
            streaming_locator_id: None,
        };
        self.api.create_streaming_locator(locator_name, &spec).await
    }

    /// Playback URLs of a locator on the configured streaming endpoint.
    ///
    /// An endpoint that is not running is logged, not started.
    pub async fn get_streaming_urls(&self, locator_name: &str) -> MediaServicesResult<Vec<String>> {
        let endpoint = self
            .api
            .get_streaming_endpoint(&self.streaming_endpoint_name)
            .await?;

        if endpoint.properties.resource_state != Some(StreamingEndpointState::Running) {
            warn!(
                streaming_endpoint = self.streaming_endpoint_name.as_str(),
                state = ?endpoint.properties.resource_state,
                "Streaming endpoint is not running; URLs will not play until it is started"
            );
        }

        let paths = self.api.list_streaming_paths(locator_name).await?;
        let urls = streaming_urls(&endpoint.properties.host_name, &paths.streaming_paths);
        info!(locator_name = locator_name, count = urls.len(), "Streaming URLs resolved");
        Ok(urls)
    }
}
