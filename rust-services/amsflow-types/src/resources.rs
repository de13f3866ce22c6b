//! Management resource schemas
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


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope shared by every management resource: a name plus a typed
/// `properties` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub properties: P,
}

impl<P> Resource<P> {
    pub fn new(name: impl Into<String>, properties: P) -> Self {
        Self {
            id: None,
            name: name.into(),
            properties,
        }
    }
}

// ============================================================================
// Transforms
// ============================================================================

pub type Transform = Resource<TransformSpec>;

/// Desired encoding recipe of a transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub outputs: Vec<TransformOutput>,
}

impl TransformSpec {
    /// Single-output transform using a built-in encoder preset
    pub fn built_in(preset_name: impl Into<String>) -> Self {
        Self {
            description: None,
            outputs: vec![TransformOutput {
                preset: Preset::BuiltInStandardEncoder {
                    preset_name: preset_name.into(),
                },
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutput {
    pub preset: Preset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum Preset {
    #[serde(
        rename = "#Microsoft.Media.BuiltInStandardEncoderPreset",
        rename_all = "camelCase"
    )]
    BuiltInStandardEncoder { preset_name: String },

    /// Any other preset kind; only read back from existing transforms
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Assets
// ============================================================================

pub type Asset = Resource<AssetProperties>;

/// Asset properties. All server-populated; created empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Permission scope of an asset container SAS URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerSasPermission {
    Read,
    ReadWrite,
    ReadWriteDelete,
}

/// Body of a `listContainerSas` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContainerSasInput {
    pub permissions: ContainerSasPermission,
    pub expiry_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetContainerSas {
    #[serde(default)]
    pub asset_container_sas_urls: Vec<String>,
}

// ============================================================================
// Content key policies
// ============================================================================

pub type ContentKeyPolicy = Resource<ContentKeyPolicySpec>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKeyPolicySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: Vec<ContentKeyPolicyOption>,
}

/// One key delivery option paired with its access restriction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKeyPolicyOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_option_id: Option<String>,
    pub name: String,
    pub configuration: ContentKeyPolicyConfiguration,
    pub restriction: ContentKeyPolicyRestriction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum ContentKeyPolicyConfiguration {
    #[serde(
        rename = "#Microsoft.Media.ContentKeyPolicyWidevineConfiguration",
        rename_all = "camelCase"
    )]
    Widevine { widevine_template: String },

    #[serde(
        rename = "#Microsoft.Media.ContentKeyPolicyPlayReadyConfiguration",
        rename_all = "camelCase"
    )]
    PlayReady {
        licenses: Vec<PlayReadyLicense>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_custom_data: Option<String>,
    },

    /// FairPlay, ClearKey, unknown-DRM and other configurations
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum ContentKeyPolicyRestriction {
    /// License issued without any additional authorization check
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyOpenRestriction")]
    Open,

    /// Token or unknown restrictions
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReadyLicense {
    #[serde(default)]
    pub allow_test_devices: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_right: Option<PlayReadyPlayRight>,
    pub license_type: PlayReadyLicenseType,
    pub content_key_location: PlayReadyContentKeyLocation,
    pub content_type: PlayReadyContentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayReadyPlayRight {
    #[serde(default)]
    pub digital_video_only_content_restriction: bool,
    #[serde(default)]
    pub image_constraint_for_analog_component_video_restriction: bool,
    #[serde(default)]
    pub image_constraint_for_analog_computer_monitor_restriction: bool,
    pub allow_passing_video_content_to_unknown_output: UnknownOutputPassingOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownOutputPassingOption {
    NotAllowed,
    Allowed,
    AllowedWithVideoConstriction,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayReadyLicenseType {
    NonPersistent,
    Persistent,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum PlayReadyContentKeyLocation {
    #[serde(rename = "#Microsoft.Media.ContentKeyPolicyPlayReadyContentEncryptionKeyFromHeader")]
    FromHeader,

    /// Key location given by key identifier, or anything newer
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayReadyContentType {
    Unspecified,
    UltraVioletDownload,
    UltraVioletStreaming,
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Streaming
// ============================================================================

pub type StreamingLocator = Resource<StreamingLocatorSpec>;

/// Binding of an asset to a streaming policy and a content key policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingLocatorSpec {
    pub asset_name: String,
    pub streaming_policy_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_content_key_policy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_locator_id: Option<String>,
}

/// Paths published for one streaming protocol / encryption scheme pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingPath {
    pub streaming_protocol: String,
    pub encryption_scheme: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPathsResponse {
    #[serde(default)]
    pub streaming_paths: Vec<StreamingPath>,
    #[serde(default)]
    pub download_paths: Vec<String>,
}

pub type StreamingEndpoint = Resource<StreamingEndpointProperties>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingEndpointProperties {
    pub host_name: String,
    #[serde(default)]
    pub resource_state: Option<StreamingEndpointState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamingEndpointState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Deleting,
    Scaling,
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Blobs
// ============================================================================

/// Blob entry of an asset container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    pub name: String,
    pub blob_type: BlobType,
    pub content_length: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobType {
    BlockBlob,
    PageBlob,
    AppendBlob,
    #[serde(other)]
    Unknown,
}
