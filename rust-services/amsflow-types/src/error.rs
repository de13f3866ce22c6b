//! Error types for Amsflow
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


use thiserror::Error;

/// Errors raised while building or interpreting resource model values
#[derive(Error, Debug)]
pub enum AmsflowError {
    #[error("Invalid SAS URL: {0}")]
    InvalidSasUrl(String),
}

pub type Result<T> = std::result::Result<T, AmsflowError>;
