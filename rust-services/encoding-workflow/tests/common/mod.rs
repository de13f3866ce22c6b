//! In-memory Media Services account and blob storage for workflow tests
#![allow(dead_code)]

use amsflow_config::{JobInputSource, WorkflowConfig};
use amsflow_types::{
    Asset, AssetProperties, BlobItem, BlobType, ContainerSasPermission, ContainerSasUrl,
    ContentKeyPolicy, ContentKeyPolicySpec, Job, JobError, JobOutput, JobProperties, JobState,
    ListPathsResponse, Resource, StreamingEndpoint, StreamingEndpointProperties,
    StreamingEndpointState, StreamingLocator, StreamingLocatorSpec, StreamingPath, Transform,
    TransformSpec,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use media_services_client::{BlobStorage, MediaServicesApi, MediaServicesError, MediaServicesResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const STREAMING_HOST: &str = "amsaccount-usw22.streaming.media.azure.net";

/// Every remote call, in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetTransform(String),
    CreateTransform(String),
    GetContentKeyPolicy(String),
    CreateContentKeyPolicy(String),
    CreateAsset(String),
    ListContainerSas(String, ContainerSasPermission),
    DeleteAsset(String),
    CreateJob(String),
    GetJob(String),
    DeleteJob(String),
    CreateLocator(String),
    ListPaths(String),
    GetEndpoint(String),
    ListBlobs(String),
    Upload(String, String),
    Download(String, String),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn position(calls: &[Call], call: &Call) -> usize {
    calls
        .iter()
        .position(|c| c == call)
        .unwrap_or_else(|| panic!("{:?} was never made; calls: {:?}", call, calls))
}

pub fn count(calls: &[Call], predicate: impl Fn(&Call) -> bool) -> usize {
    calls.iter().filter(|c| predicate(c)).count()
}

fn not_found(kind: &str, name: &str) -> MediaServicesError {
    MediaServicesError::Api {
        status: 404,
        code: "ResourceNotFound".to_string(),
        message: format!("{} {} not found", kind, name),
    }
}

fn injected(operation: &str) -> MediaServicesError {
    MediaServicesError::Api {
        status: 500,
        code: "InternalServerError".to_string(),
        message: format!("{} failed", operation),
    }
}

pub struct FakeMediaServices {
    calls: CallLog,
    transforms: Mutex<HashMap<String, Transform>>,
    policies: Mutex<HashMap<String, ContentKeyPolicy>>,
    assets: Mutex<HashSet<String>>,
    jobs: Mutex<HashMap<String, JobProperties>>,
    /// States reported by successive `get_job` calls; the last one repeats
    job_states: Mutex<VecDeque<JobState>>,
    job_error: Mutex<Option<JobError>>,
    locators: Mutex<HashMap<String, StreamingLocatorSpec>>,
    endpoint_state: Mutex<Option<StreamingEndpointState>>,
    streaming_paths: Mutex<Vec<StreamingPath>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeMediaServices {
    pub fn new(calls: CallLog) -> Self {
        Self {
            calls,
            transforms: Mutex::new(HashMap::new()),
            policies: Mutex::new(HashMap::new()),
            assets: Mutex::new(HashSet::new()),
            jobs: Mutex::new(HashMap::new()),
            job_states: Mutex::new(VecDeque::from([JobState::Finished])),
            job_error: Mutex::new(None),
            locators: Mutex::new(HashMap::new()),
            endpoint_state: Mutex::new(Some(StreamingEndpointState::Running)),
            streaming_paths: Mutex::new(vec![
                StreamingPath {
                    streaming_protocol: "Hls".to_string(),
                    encryption_scheme: "CommonEncryptionCenc".to_string(),
                    paths: vec![
                        "/locator/manifest.ism/manifest(format=m3u8-cmaf,encryption=cenc)".to_string(),
                        "/locator/manifest.ism/manifest(format=m3u8-aapl,encryption=cenc)".to_string(),
                    ],
                },
                StreamingPath {
                    streaming_protocol: "Dash".to_string(),
                    encryption_scheme: "CommonEncryptionCenc".to_string(),
                    paths: vec!["/locator/manifest.ism/manifest(format=mpd-time-cmaf,encryption=cenc)".to_string()],
                },
            ]),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_job_states(self, states: &[JobState]) -> Self {
        *self.job_states.lock().unwrap() = states.iter().copied().collect();
        self
    }

    pub fn with_job_error(self, error: JobError) -> Self {
        *self.job_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_endpoint_state(self, state: Option<StreamingEndpointState>) -> Self {
        *self.endpoint_state.lock().unwrap() = state;
        self
    }

    pub fn with_transform(self, name: &str, spec: TransformSpec) -> Self {
        self.transforms
            .lock()
            .unwrap()
            .insert(name.to_string(), Resource::new(name, spec));
        self
    }

    pub fn with_content_key_policy(self, name: &str, spec: ContentKeyPolicySpec) -> Self {
        self.policies
            .lock()
            .unwrap()
            .insert(name.to_string(), Resource::new(name, spec));
        self
    }

    /// Make every call of `operation` fail with a server error
    pub fn failing(self, operation: &'static str) -> Self {
        self.failing.lock().unwrap().insert(operation);
        self
    }

    pub fn submitted_job(&self, name: &str) -> Option<JobProperties> {
        self.jobs.lock().unwrap().get(name).cloned()
    }

    pub fn locator(&self, name: &str) -> Option<StreamingLocatorSpec> {
        self.locators.lock().unwrap().get(name).cloned()
    }

    pub fn content_key_policy(&self, name: &str) -> Option<ContentKeyPolicy> {
        self.policies.lock().unwrap().get(name).cloned()
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.lock().unwrap().contains(name)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: &'static str) -> MediaServicesResult<()> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(injected(operation));
        }
        Ok(())
    }

    fn next_state(&self) -> JobState {
        let mut states = self.job_states.lock().unwrap();
        if states.len() > 1 {
            states.pop_front().unwrap_or(JobState::Queued)
        } else {
            states.front().copied().unwrap_or(JobState::Queued)
        }
    }
}

#[async_trait]
impl MediaServicesApi for FakeMediaServices {
    async fn get_transform(&self, name: &str) -> MediaServicesResult<Option<Transform>> {
        self.record(Call::GetTransform(name.to_string()));
        self.check("get_transform")?;
        Ok(self.transforms.lock().unwrap().get(name).cloned())
    }

    async fn create_or_update_transform(
        &self,
        name: &str,
        spec: &TransformSpec,
    ) -> MediaServicesResult<Transform> {
        self.record(Call::CreateTransform(name.to_string()));
        self.check("create_transform")?;
        let transform = Resource::new(name, spec.clone());
        self.transforms
            .lock()
            .unwrap()
            .insert(name.to_string(), transform.clone());
        Ok(transform)
    }

    async fn get_content_key_policy(&self, name: &str) -> MediaServicesResult<Option<ContentKeyPolicy>> {
        self.record(Call::GetContentKeyPolicy(name.to_string()));
        self.check("get_content_key_policy")?;
        Ok(self.policies.lock().unwrap().get(name).cloned())
    }

    async fn create_or_update_content_key_policy(
        &self,
        name: &str,
        spec: &ContentKeyPolicySpec,
    ) -> MediaServicesResult<ContentKeyPolicy> {
        self.record(Call::CreateContentKeyPolicy(name.to_string()));
        self.check("create_content_key_policy")?;
        let policy = Resource::new(name, spec.clone());
        self.policies
            .lock()
            .unwrap()
            .insert(name.to_string(), policy.clone());
        Ok(policy)
    }

    async fn create_or_update_asset(&self, name: &str) -> MediaServicesResult<Asset> {
        self.record(Call::CreateAsset(name.to_string()));
        self.check("create_asset")?;
        self.assets.lock().unwrap().insert(name.to_string());
        Ok(Resource::new(
            name,
            AssetProperties {
                container: Some(name.to_string()),
                ..Default::default()
            },
        ))
    }

    async fn list_container_sas(
        &self,
        asset_name: &str,
        permissions: ContainerSasPermission,
        expiry_time: DateTime<Utc>,
    ) -> MediaServicesResult<Vec<String>> {
        self.record(Call::ListContainerSas(asset_name.to_string(), permissions));
        self.check("list_container_sas")?;
        assert!(expiry_time > Utc::now(), "SAS requested with an expiry in the past");
        if !self.assets.lock().unwrap().contains(asset_name) {
            return Err(not_found("asset", asset_name));
        }
        Ok(vec![format!(
            "https://storacct.blob.core.windows.net/{}?sv=2020-10-02&sr=c&sig=fake",
            asset_name
        )])
    }

    async fn delete_asset(&self, name: &str) -> MediaServicesResult<()> {
        self.record(Call::DeleteAsset(name.to_string()));
        self.check("delete_asset")?;
        self.assets.lock().unwrap().remove(name);
        Ok(())
    }

    async fn create_job(
        &self,
        transform_name: &str,
        job_name: &str,
        properties: &JobProperties,
    ) -> MediaServicesResult<Job> {
        self.record(Call::CreateJob(job_name.to_string()));
        self.check("create_job")?;
        if !self.transforms.lock().unwrap().contains_key(transform_name) {
            return Err(not_found("transform", transform_name));
        }
        self.jobs
            .lock()
            .unwrap()
            .insert(job_name.to_string(), properties.clone());
        Ok(Resource::new(job_name, properties.clone()))
    }

    async fn get_job(&self, _transform_name: &str, job_name: &str) -> MediaServicesResult<Job> {
        self.record(Call::GetJob(job_name.to_string()));
        self.check("get_job")?;
        let mut properties = self
            .jobs
            .lock()
            .unwrap()
            .get(job_name)
            .cloned()
            .ok_or_else(|| not_found("job", job_name))?;

        let state = self.next_state();
        properties.state = Some(state);
        if state == JobState::Error {
            let error = self.job_error.lock().unwrap().clone();
            properties.outputs = properties
                .outputs
                .iter()
                .map(|output| JobOutput::Asset {
                    asset_name: output.asset_name().to_string(),
                    state: Some(JobState::Error),
                    progress: Some(0),
                    error: error.clone(),
                })
                .collect();
        }
        Ok(Resource::new(job_name, properties))
    }

    async fn delete_job(&self, _transform_name: &str, job_name: &str) -> MediaServicesResult<()> {
        self.record(Call::DeleteJob(job_name.to_string()));
        self.check("delete_job")?;
        self.jobs.lock().unwrap().remove(job_name);
        Ok(())
    }

    async fn create_streaming_locator(
        &self,
        name: &str,
        spec: &StreamingLocatorSpec,
    ) -> MediaServicesResult<StreamingLocator> {
        self.record(Call::CreateLocator(name.to_string()));
        self.check("create_streaming_locator")?;
        self.locators
            .lock()
            .unwrap()
            .insert(name.to_string(), spec.clone());
        Ok(Resource::new(name, spec.clone()))
    }

    async fn list_streaming_paths(&self, locator_name: &str) -> MediaServicesResult<ListPathsResponse> {
        self.record(Call::ListPaths(locator_name.to_string()));
        self.check("list_streaming_paths")?;
        Ok(ListPathsResponse {
            streaming_paths: self.streaming_paths.lock().unwrap().clone(),
            download_paths: Vec::new(),
        })
    }

    async fn get_streaming_endpoint(&self, name: &str) -> MediaServicesResult<StreamingEndpoint> {
        self.record(Call::GetEndpoint(name.to_string()));
        self.check("get_streaming_endpoint")?;
        Ok(Resource::new(
            name,
            StreamingEndpointProperties {
                host_name: STREAMING_HOST.to_string(),
                resource_state: *self.endpoint_state.lock().unwrap(),
            },
        ))
    }
}

/// Blob containers keyed by container name
pub struct FakeBlobStorage {
    calls: CallLog,
    containers: Mutex<HashMap<String, Vec<(BlobItem, Vec<u8>)>>>,
    failing_downloads: Mutex<HashSet<String>>,
}

impl FakeBlobStorage {
    pub fn new(calls: CallLog) -> Self {
        Self {
            calls,
            containers: Mutex::new(HashMap::new()),
            failing_downloads: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_blob(self, container: &str, name: &str, blob_type: BlobType, content: &[u8]) -> Self {
        self.containers
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .push((
                BlobItem {
                    name: name.to_string(),
                    blob_type,
                    content_length: Some(content.len() as u64),
                },
                content.to_vec(),
            ));
        self
    }

    pub fn failing_download(self, blob_name: &str) -> Self {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(blob_name.to_string());
        self
    }

    pub fn blob_names(&self, container: &str) -> Vec<String> {
        self.containers
            .lock()
            .unwrap()
            .get(container)
            .map(|blobs| blobs.iter().map(|(item, _)| item.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn blob_content(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.containers
            .lock()
            .unwrap()
            .get(container)?
            .iter()
            .find(|(item, _)| item.name == name)
            .map(|(_, content)| content.clone())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BlobStorage for FakeBlobStorage {
    async fn list_blobs(&self, container: &ContainerSasUrl) -> MediaServicesResult<Vec<BlobItem>> {
        self.record(Call::ListBlobs(container.container().to_string()));
        Ok(self
            .containers
            .lock()
            .unwrap()
            .get(container.container())
            .map(|blobs| blobs.iter().map(|(item, _)| item.clone()).collect())
            .unwrap_or_default())
    }

    async fn upload_file(
        &self,
        container: &ContainerSasUrl,
        blob_name: &str,
        source: &Path,
    ) -> MediaServicesResult<u64> {
        self.record(Call::Upload(container.container().to_string(), blob_name.to_string()));
        let content = tokio::fs::read(source).await?;
        let size = content.len() as u64;
        self.containers
            .lock()
            .unwrap()
            .entry(container.container().to_string())
            .or_default()
            .push((
                BlobItem {
                    name: blob_name.to_string(),
                    blob_type: BlobType::BlockBlob,
                    content_length: Some(size),
                },
                content,
            ));
        Ok(size)
    }

    async fn download_to_file(
        &self,
        container: &ContainerSasUrl,
        blob_name: &str,
        destination: &Path,
    ) -> MediaServicesResult<u64> {
        self.record(Call::Download(container.container().to_string(), blob_name.to_string()));
        if self.failing_downloads.lock().unwrap().contains(blob_name) {
            return Err(MediaServicesError::Storage {
                status: 403,
                code: "AuthorizationFailure".to_string(),
                message: "This request is not authorized to perform this operation.".to_string(),
            });
        }
        let content = self
            .blob_content(container.container(), blob_name)
            .ok_or_else(|| MediaServicesError::Storage {
                status: 404,
                code: "BlobNotFound".to_string(),
                message: format!("{} does not exist", blob_name),
            })?;
        tokio::fs::write(destination, &content).await?;
        Ok(content.len() as u64)
    }
}

/// Configuration pointing at nothing real, with fast polling
pub fn test_config(input: JobInputSource, output_folder: PathBuf) -> WorkflowConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("AMS_SUBSCRIPTION_ID", "00000000-0000-0000-0000-000000000001"),
        ("AMS_RESOURCE_GROUP", "amsResourceGroup"),
        ("AMS_ACCOUNT_NAME", "amsaccount"),
        ("AMS_CLIENT_ID", "client"),
        ("AMS_CLIENT_SECRET", "secret"),
        ("AMS_TENANT_ID", "tenant"),
        ("AMS_POLL_INTERVAL_SECS", "1"),
        ("AMS_JOB_TIMEOUT_SECS", "30"),
    ]);
    let mut config = WorkflowConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration is valid");
    config.input = input;
    config.output_folder = output_folder;
    config
}

pub fn polling(timeout_secs: u64, interval_secs: u64) -> amsflow_config::PollingConfig {
    amsflow_config::PollingConfig {
        timeout: Duration::from_secs(timeout_secs),
        interval: Duration::from_secs(interval_secs),
    }
}
