//! Per-run resource names
//!
//! Every resource created by one run shares a single uniqueness token, so
//! the input asset, output asset, job and locator of a run can be matched
//! up in the portal.

use rand::Rng;
use std::path::Path;
use uuid::Uuid;

/// Names of the resources one run creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunNames {
    pub token: Uuid,
    pub input_asset: String,
    pub output_asset: String,
    pub job: String,
    pub locator: String,
}

impl RunNames {
    /// Fresh names under `prefix`
    pub fn generate(prefix: &str) -> Self {
        Self::from_token(prefix, Uuid::new_v4())
    }

    pub fn from_token(prefix: &str, token: Uuid) -> Self {
        Self {
            token,
            input_asset: format!("{}-input-{}", prefix, token),
            output_asset: format!("{}-output-{}", prefix, token),
            job: format!("{}-job-{}", prefix, token),
            locator: format!("locator{}", token),
        }
    }
}

/// Blob name for an uploaded local file: its base name with a random
/// integer in `0..=100` appended.
///
/// Returns `None` for a path without a file name (`/`, `..`).
pub fn upload_blob_name(source: &Path) -> Option<String> {
    let base = source.file_name()?.to_string_lossy();
    let suffix: u8 = rand::thread_rng().gen_range(0..=100);
    Some(format!("{}{}", base, suffix))
}
