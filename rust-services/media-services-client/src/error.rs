//! Error types for the media services clients
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


use amsflow_types::AmsflowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaServicesError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API request failed ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Storage request failed ({status}): {code}: {message}")]
    Storage {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid resource: {0}")]
    Resource(#[from] AmsflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),
}

impl MediaServicesError {
    /// HTTP status of a rejected request, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            MediaServicesError::Api { status, .. } | MediaServicesError::Storage { status, .. } => {
                Some(*status)
            }
            MediaServicesError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type MediaServicesResult<T> = Result<T, MediaServicesError>;
