//! Get-or-create for named account resources

use amsflow_types::{ContentKeyPolicy, ContentKeyPolicySpec, Transform, TransformSpec};
use async_trait::async_trait;
use media_services_client::{MediaServicesApi, MediaServicesResult};
use tracing::{debug, info};

/// A named resource that can be looked up and created from a desired spec
#[async_trait]
pub trait EnsurableResource: Sized + Send {
    type Spec: Send + Sync;

    /// Human-readable kind, for logs and errors
    const KIND: &'static str;

    async fn fetch(api: &dyn MediaServicesApi, name: &str) -> MediaServicesResult<Option<Self>>;

    async fn create(
        api: &dyn MediaServicesApi,
        name: &str,
        spec: &Self::Spec,
    ) -> MediaServicesResult<Self>;
}

#[async_trait]
impl EnsurableResource for Transform {
    type Spec = TransformSpec;
    const KIND: &'static str = "transform";

    async fn fetch(api: &dyn MediaServicesApi, name: &str) -> MediaServicesResult<Option<Self>> {
        api.get_transform(name).await
    }

    async fn create(
        api: &dyn MediaServicesApi,
        name: &str,
        spec: &TransformSpec,
    ) -> MediaServicesResult<Self> {
        api.create_or_update_transform(name, spec).await
    }
}

#[async_trait]
impl EnsurableResource for ContentKeyPolicy {
    type Spec = ContentKeyPolicySpec;
    const KIND: &'static str = "content key policy";

    async fn fetch(api: &dyn MediaServicesApi, name: &str) -> MediaServicesResult<Option<Self>> {
        api.get_content_key_policy(name).await
    }

    async fn create(
        api: &dyn MediaServicesApi,
        name: &str,
        spec: &ContentKeyPolicySpec,
    ) -> MediaServicesResult<Self> {
        api.create_or_update_content_key_policy(name, spec).await
    }
}

/// Return the resource named `name`, creating it from `spec` when absent.
///
/// An existing resource is returned as-is, even if it differs from `spec`.
pub async fn ensure<R: EnsurableResource>(
    api: &dyn MediaServicesApi,
    name: &str,
    spec: &R::Spec,
) -> MediaServicesResult<R> {
    if let Some(existing) = R::fetch(api, name).await? {
        debug!(kind = R::KIND, name = name, "Resource already exists");
        return Ok(existing);
    }

    info!(kind = R::KIND, name = name, "Creating resource");
    R::create(api, name, spec).await
}

/// Ensure a transform with a single built-in preset output
pub async fn ensure_transform(
    api: &dyn MediaServicesApi,
    name: &str,
    preset_name: &str,
) -> MediaServicesResult<Transform> {
    ensure::<Transform>(api, name, &TransformSpec::built_in(preset_name)).await
}
