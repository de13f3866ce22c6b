//! Full workflow over HTTP: token exchange, management API and blob
//! storage all served by one mock server.

use amsflow_config::{JobInputSource, WorkflowConfig};
use amsflow_types::{ContentKeyPolicySpec, Resource, TransformSpec};
use encoding_workflow::delivery::multi_drm_open_policy;
use encoding_workflow::{connect, Workflow, WorkflowError, WorkflowOutcome};
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str =
    "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Media/mediaServices/acct1";
const TRANSFORM: &str = "TransformWithAdaptiveStreamingPreset";
const POLICY: &str = "CommonEncryptionCencDrmContentKeyPolicy";
const INPUT_URL: &str = "https://example.com/media/AzurePromo.mp4";

fn config(server: &MockServer, output: &TempDir) -> WorkflowConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("AMS_ARM_ENDPOINT", server.uri()),
        ("AMS_AAD_ENDPOINT", server.uri()),
        ("AMS_SUBSCRIPTION_ID", "sub-1".to_string()),
        ("AMS_RESOURCE_GROUP", "rg-1".to_string()),
        ("AMS_ACCOUNT_NAME", "acct1".to_string()),
        ("AMS_CLIENT_ID", "client".to_string()),
        ("AMS_CLIENT_SECRET", "secret".to_string()),
        ("AMS_TENANT_ID", "tenant-1".to_string()),
        ("AMS_INPUT_URL", INPUT_URL.to_string()),
        ("AMS_OUTPUT_FOLDER", output.path().display().to_string()),
        ("AMS_POLL_INTERVAL_SECS", "1".to_string()),
        ("AMS_JOB_TIMEOUT_SECS", "30".to_string()),
        ("AMS_HTTP_TIMEOUT_SECS", "10".to_string()),
    ]);
    WorkflowConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn arm(path_suffix: &str) -> String {
    format!("{}/{}", ACCOUNT, path_suffix)
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "live-token"
        })))
        .mount(server)
        .await;
}

async fn mount_account(server: &MockServer, job_state: &str) {
    Mock::given(method("GET"))
        .and(path(arm(&format!("transforms/{}", TRANSFORM))))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "NotFound", "message": "Transform not found" }
        })))
        .mount(server)
        .await;

    let transform = Resource::new(TRANSFORM, TransformSpec::built_in("AdaptiveStreaming"));
    Mock::given(method("PUT"))
        .and(path(arm(&format!("transforms/{}", TRANSFORM))))
        .respond_with(ResponseTemplate::new(201).set_body_json(&transform))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(format!("^{}/assets/prefix-output-[0-9a-f-]+$", ACCOUNT)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "prefix-output",
            "properties": { "container": "asset-out" }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(format!("^{}/assets/prefix-output-[0-9a-f-]+/listContainerSas$", ACCOUNT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assetContainerSasUrls": [format!("{}/asset-out?sv=2020-10-02&sr=c&sp=rl&sig=abc", server.uri())]
        })))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(format!("^{}/transforms/{}/jobs/prefix-job-[0-9a-f-]+$", ACCOUNT, TRANSFORM)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "prefix-job",
            "properties": {
                "state": "Queued",
                "input": { "@odata.type": "#Microsoft.Media.JobInputHttp", "files": [INPUT_URL] },
                "outputs": [{ "@odata.type": "#Microsoft.Media.JobOutputAsset", "assetName": "prefix-output" }]
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(format!("^{}/transforms/{}/jobs/prefix-job-[0-9a-f-]+$", ACCOUNT, TRANSFORM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "prefix-job",
            "properties": {
                "state": job_state,
                "input": { "@odata.type": "#Microsoft.Media.JobInputHttp", "files": [INPUT_URL] },
                "outputs": [{
                    "@odata.type": "#Microsoft.Media.JobOutputAsset",
                    "assetName": "prefix-output",
                    "state": job_state,
                    "progress": 100,
                    "error": if job_state == "Error" {
                        json!({ "code": "ContentMalformed", "message": "Bad input", "category": "Content", "details": [] })
                    } else {
                        json!(null)
                    }
                }]
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(format!("^{}/transforms/{}/jobs/prefix-job-[0-9a-f-]+$", ACCOUNT, TRANSFORM)))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_delivery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/asset-out"))
        .and(query_param("comp", "list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="asset-out">
  <Blobs>
    <Blob><Name>video_1280x720.mp4</Name><Properties><Content-Length>5</Content-Length><BlobType>BlockBlob</BlobType></Properties></Blob>
    <Blob><Name>manifest.ism</Name><Properties><Content-Length>7</Content-Length><BlobType>BlockBlob</BlobType></Properties></Blob>
  </Blobs>
  <NextMarker />
</EnumerationResults>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/asset-out/video_1280x720.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/asset-out/manifest.ism"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<smil/>".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(arm(&format!("contentKeyPolicies/{}", POLICY))))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "NotFound", "message": "Policy not found" }
        })))
        .mount(server)
        .await;

    let policy: Resource<ContentKeyPolicySpec> = Resource::new(POLICY, multi_drm_open_policy());
    Mock::given(method("PUT"))
        .and(path(arm(&format!("contentKeyPolicies/{}", POLICY))))
        .respond_with(ResponseTemplate::new(200).set_body_json(&policy))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(format!("^{}/streamingLocators/locator[0-9a-f-]+$", ACCOUNT)))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "locator",
            "properties": {
                "assetName": "prefix-output",
                "streamingPolicyName": "Predefined_MultiDrmCencStreaming",
                "defaultContentKeyPolicyName": POLICY
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(format!("^{}/streamingLocators/locator[0-9a-f-]+/listPaths$", ACCOUNT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "streamingPaths": [
                {
                    "streamingProtocol": "Hls",
                    "encryptionScheme": "CommonEncryptionCbcs",
                    "paths": ["/abc/manifest.ism/manifest(format=m3u8-aapl,encryption=cbcs-aapl)"]
                },
                {
                    "streamingProtocol": "Dash",
                    "encryptionScheme": "CommonEncryptionCenc",
                    "paths": [
                        "/abc/manifest.ism/manifest(format=mpd-time-csf,encryption=cenc)",
                        "/abc/manifest.ism/manifest(format=mpd-time-cmaf,encryption=cenc)"
                    ]
                }
            ],
            "downloadPaths": []
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(arm("streamingEndpoints/default")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "default",
            "properties": {
                "hostName": "acct1-usw22.streaming.media.azure.net",
                "resourceState": "Running"
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_finished_job_is_downloaded_and_published() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_account(&server, "Finished").await;
    mount_delivery(&server).await;
    let output = TempDir::new().unwrap();
    let config = config(&server, &output);

    let (api, blobs) = connect(&config).await.unwrap();
    let outcome = Workflow::new(config, api, blobs).run().await.unwrap();

    let report = match outcome {
        WorkflowOutcome::Finished(report) => report,
        other => panic!("expected Finished, got {:?}", other),
    };
    assert_eq!(
        report.streaming_urls,
        vec![
            "https://acct1-usw22.streaming.media.azure.net/abc/manifest.ism/manifest(format=m3u8-aapl,encryption=cbcs-aapl)",
            "https://acct1-usw22.streaming.media.azure.net/abc/manifest.ism/manifest(format=mpd-time-csf,encryption=cenc)",
        ]
    );

    let directory = output.path().join(&report.output_asset);
    assert_eq!(report.downloads.directory, directory);
    assert_eq!(std::fs::read(directory.join("video_1280x720.mp4")).unwrap(), b"video");
    assert_eq!(std::fs::read(directory.join("manifest.ism")).unwrap(), b"<smil/>");
}

#[tokio::test]
async fn test_failed_job_is_reported_without_delivery() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_account(&server, "Error").await;
    let output = TempDir::new().unwrap();
    let config = config(&server, &output);

    let (api, blobs) = connect(&config).await.unwrap();
    let outcome = Workflow::new(config, api, blobs).run().await.unwrap();

    match outcome {
        WorkflowOutcome::JobFailed { error, .. } => {
            let error = error.unwrap();
            assert_eq!(error.code, "ContentMalformed");
            assert_eq!(error.to_string(), "ContentMalformed: Bad input (category: Content)");
        }
        other => panic!("expected JobFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_credentials_fail_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let err = connect(&config(&server, &output)).await.err().unwrap();
    assert!(matches!(err, WorkflowError::Authentication(_)));
    assert!(err.to_string().contains("invalid_client"));
}
