//! Configuration management for the encoding workflow

use config::ConfigError;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sample input used when neither a local file nor a URL is configured
pub const DEFAULT_INPUT_URL: &str =
    "https://amssamples.streaming.mediaservices.windows.net/2e91931e-0d29-482b-a42b-9aadc93eb825/AzurePromo.mp4";

/// Longest job wait accepted from the environment (30 days)
pub const MAX_JOB_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Longest SAS lifetime accepted from the environment (365 days)
pub const MAX_SAS_EXPIRY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Management API location and account identity
#[derive(Debug, Clone, Deserialize)]
pub struct ArmConfig {
    pub arm_endpoint: String,
    pub aad_endpoint: String,
    pub arm_audience: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub account_name: String,
    pub region: String,
}

/// Service principal used for the client-credentials token exchange
#[derive(Clone, Deserialize)]
pub struct ServicePrincipalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl fmt::Debug for ServicePrincipalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Where the job reads its media from: a local file XOR a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum JobInputSource {
    File(PathBuf),
    Url(String),
}

impl JobInputSource {
    /// Extension of the input, without the dot (`mp4`), if it has one
    pub fn input_extension(&self) -> Option<String> {
        let path = match self {
            JobInputSource::File(path) => path.as_path(),
            JobInputSource::Url(url) => {
                let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
                Path::new(path)
            }
        };
        path.extension().map(|ext| ext.to_string_lossy().into_owned())
    }
}

/// Resource names and prefixes
#[derive(Debug, Clone, Deserialize)]
pub struct NamingConfig {
    pub name_prefix: String,
    pub transform_name: String,
    pub content_key_policy_name: String,
    pub streaming_endpoint_name: String,
}

/// Job polling bounds
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PollingConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            interval: Duration::from_secs(15),
        }
    }
}

/// Workflow configuration, built once and passed to every component
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    pub arm: ArmConfig,
    pub credentials: ServicePrincipalConfig,
    pub naming: NamingConfig,
    pub polling: PollingConfig,
    pub input: JobInputSource,
    pub output_folder: PathBuf,
    /// Lifetime of every SAS URL requested for an asset container
    pub sas_expiry: Duration,
    pub http_timeout: Duration,
    pub log_level: Option<String>,
}

impl WorkflowConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| ConfigError::NotFound(key.to_string()));
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let seconds = |key: &str, default: u64| -> Result<Duration, ConfigError> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| ConfigError::Message(format!("{} must be a number of seconds: {}", key, e))),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let arm = ArmConfig {
            arm_endpoint: with_trailing_slash(or_default("AMS_ARM_ENDPOINT", "https://management.azure.com/")),
            aad_endpoint: with_trailing_slash(or_default("AMS_AAD_ENDPOINT", "https://login.microsoftonline.com/")),
            arm_audience: with_trailing_slash(or_default(
                "AMS_ARM_AAD_AUDIENCE",
                "https://management.core.windows.net/",
            )),
            subscription_id: required("AMS_SUBSCRIPTION_ID")?,
            resource_group: required("AMS_RESOURCE_GROUP")?,
            account_name: required("AMS_ACCOUNT_NAME")?,
            region: or_default("AMS_REGION", "West US 2"),
        };

        let credentials = ServicePrincipalConfig {
            client_id: required("AMS_CLIENT_ID")?,
            client_secret: required("AMS_CLIENT_SECRET")?,
            tenant_id: required("AMS_TENANT_ID")?,
        };

        let input = match (var("AMS_INPUT_FILE"), var("AMS_INPUT_URL")) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Message(
                    "AMS_INPUT_FILE and AMS_INPUT_URL are mutually exclusive".to_string(),
                ));
            }
            (Some(file), None) => JobInputSource::File(PathBuf::from(file)),
            (None, Some(url)) => JobInputSource::Url(url),
            (None, None) => JobInputSource::Url(DEFAULT_INPUT_URL.to_string()),
        };

        let naming = NamingConfig {
            name_prefix: or_default("AMS_NAME_PREFIX", "prefix"),
            transform_name: or_default("AMS_TRANSFORM_NAME", "TransformWithAdaptiveStreamingPreset"),
            content_key_policy_name: or_default(
                "AMS_CONTENT_KEY_POLICY_NAME",
                "CommonEncryptionCencDrmContentKeyPolicy",
            ),
            streaming_endpoint_name: or_default("AMS_STREAMING_ENDPOINT_NAME", "default"),
        };

        let polling = PollingConfig {
            timeout: seconds("AMS_JOB_TIMEOUT_SECS", 600)?,
            interval: seconds("AMS_POLL_INTERVAL_SECS", 15)?,
        };

        let config = Self {
            arm,
            credentials,
            naming,
            polling,
            input,
            output_folder: PathBuf::from(or_default("AMS_OUTPUT_FOLDER", "Temp")),
            sas_expiry: seconds("AMS_SAS_EXPIRY_SECS", 3600)?,
            http_timeout: seconds("AMS_HTTP_TIMEOUT_SECS", 300)?,
            log_level: Some(or_default("LOG_LEVEL", "info")),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the workflow misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval.is_zero() {
            return Err(ConfigError::Message(
                "AMS_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.sas_expiry.is_zero() {
            return Err(ConfigError::Message(
                "AMS_SAS_EXPIRY_SECS must be greater than zero".to_string(),
            ));
        }
        if self.polling.timeout > MAX_JOB_TIMEOUT {
            return Err(ConfigError::Message(format!(
                "AMS_JOB_TIMEOUT_SECS must not exceed {}",
                MAX_JOB_TIMEOUT.as_secs()
            )));
        }
        if self.sas_expiry > MAX_SAS_EXPIRY {
            return Err(ConfigError::Message(format!(
                "AMS_SAS_EXPIRY_SECS must not exceed {}",
                MAX_SAS_EXPIRY.as_secs()
            )));
        }
        if self.naming.name_prefix.is_empty() {
            return Err(ConfigError::Message("AMS_NAME_PREFIX must not be empty".to_string()));
        }
        Ok(())
    }

    /// Base URL of the media services account under the management endpoint
    pub fn account_url(&self) -> String {
        format!(
            "{}subscriptions/{}/resourceGroups/{}/providers/Microsoft.Media/mediaServices/{}",
            self.arm.arm_endpoint, self.arm.subscription_id, self.arm.resource_group, self.arm.account_name
        )
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
