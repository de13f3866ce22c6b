//! Live run against a real Media Services account.
//!
//! Needs the AMS_* variables of a test account (see `.env.example`) and creates
//! billable resources: run with `cargo test -p amsflow-tests -- --ignored`.

use amsflow_config::WorkflowConfig;
use encoding_workflow::{connect, Workflow, WorkflowOutcome};

#[tokio::test]
#[ignore] // Requires Media Services credentials and a running streaming endpoint
async fn test_live_encode_and_publish() {
    let config = WorkflowConfig::from_env().expect("AMS_* variables must be set");
    let output_folder = config.output_folder.clone();

    let (api, blobs) = connect(&config).await.expect("Failed to authenticate");
    let outcome = Workflow::new(config, api, blobs)
        .run()
        .await
        .expect("Workflow failed");

    match outcome {
        WorkflowOutcome::Finished(report) => {
            println!("Downloaded {} files to {}", report.downloads.files.len(), output_folder.display());
            for url in &report.streaming_urls {
                println!("{}", url);
            }
            assert!(!report.streaming_urls.is_empty());
        }
        other => panic!("Job did not finish: {:?}", other),
    }
}
