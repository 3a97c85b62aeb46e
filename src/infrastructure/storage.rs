use crate::config::{CredentialSource, StageConfig};
use crate::services::storage::S3ObjectStore;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use tracing::info;

/// Builds an S3 client for `config`.
///
/// With `CredentialSource::Ambient` the default AWS provider chain resolves
/// credentials; with `CredentialSource::Static` the given keys are used as-is.
pub async fn setup_client(config: &StageConfig) -> aws_sdk_s3::Client {
    let region = Region::new(config.region.clone());

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

    if let Some(endpoint_url) = &config.endpoint_url {
        info!("☁️  S3 endpoint override: {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }

    if let CredentialSource::Static {
        access_key_id,
        secret_access_key,
    } = &config.credentials
    {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "static",
        ));
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.force_path_style)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

pub async fn setup_storage(config: &StageConfig) -> S3ObjectStore {
    S3ObjectStore::new(setup_client(config).await)
        .with_multipart(config.multipart_threshold, config.part_size)
}
