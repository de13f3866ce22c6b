//! Encoding Workflow
//!
//! Drives one encode of a media file on a Media Services account:
//! - ensures the adaptive streaming transform
//! - uploads a local input (or references a URL)
//! - submits the job and polls it to a terminal state
//! - downloads the encoded output
//! - publishes it with multi-DRM protection and prints the playback URLs
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

pub mod assets;
pub mod delivery;
pub mod ensure;
pub mod error;
pub mod jobs;
pub mod naming;
pub mod poller;
pub mod results;
pub mod sas;
pub mod workflow;

pub use error::{BlobDownloadFailure, BlobTransferError, DownloadError, WorkflowError};
pub use poller::PollOutcome;
pub use workflow::{connect, Workflow, WorkflowOutcome, WorkflowReport};
