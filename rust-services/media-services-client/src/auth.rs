//! Service principal authentication
//!
//! OAuth2 client-credentials exchange against the identity endpoint,
//! scoped to the management API audience.
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


use amsflow_config::WorkflowConfig;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;
use tracing::info;

use crate::error::{MediaServicesError, MediaServicesResult};

/// Bearer token for the management API
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Client id / secret / tenant triple plus the endpoints to exchange it at
#[derive(Debug, Clone)]
pub struct ServicePrincipalCredential {
    token_url: String,
    scope: String,
    client_id: String,
    client_secret: String,
}

/// Assumed when the token endpoint omits or garbles `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl ServicePrincipalCredential {
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            token_url: format!(
                "{}{}/oauth2/v2.0/token",
                config.arm.aad_endpoint, config.credentials.tenant_id
            ),
            scope: format!("{}.default", config.arm.arm_audience),
            client_id: config.credentials.client_id.clone(),
            client_secret: config.credentials.client_secret.clone(),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Exchange the credential for a bearer token
    pub async fn acquire_token(&self, http: &reqwest::Client) -> MediaServicesResult<AccessToken> {
        info!(client_id = self.client_id, "Acquiring management API token");

        let response = http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MediaServicesError::Authentication(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(MediaServicesError::Authentication(format!(
                "Identity endpoint returned {}: {}",
                status, reason
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| MediaServicesError::Authentication(format!("Invalid token response: {}", e)))?;

        let now = Utc::now();
        // Lifetimes chrono cannot represent fall back to the default
        let expires_at = token
            .expires_in
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));
        info!(expires_at = %expires_at, "Management API token acquired");

        Ok(AccessToken::new(token.access_token, expires_at))
    }
}
