use std::env;

/// Region every client is built for.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default presigned URL lifetime: 7 days.
pub const DEFAULT_EXPIRATION_SECS: i64 = 604_800;

/// Files above this size are uploaded in parts: 8 MB.
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Default multipart part size: 8 MB.
pub const DEFAULT_PART_SIZE: usize = 8 * 1024 * 1024;

/// S3 rejects non-final parts smaller than 5 MB.
pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// Where the S3 client gets its credentials from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialSource {
    /// The standard AWS chain: env vars, shared profile, SSO, instance metadata.
    #[default]
    Ambient,
    /// Fixed keys, e.g. for a local MinIO.
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
}

/// Runtime configuration for the staging tool
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Storage region (fixed: "us-east-1")
    pub region: String,

    /// Custom S3 endpoint for S3-compatible stores (default: none)
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing (default: false)
    pub force_path_style: bool,

    pub credentials: CredentialSource,

    /// Write buffer size for downloads in bytes (default: 8 KB)
    pub chunk_size: usize,

    /// Upload size above which multipart is used (default: 8 MB)
    pub multipart_threshold: u64,

    /// Multipart part size in bytes, at least 5 MB (default: 8 MB)
    pub part_size: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            force_path_style: false,
            credentials: CredentialSource::Ambient,
            chunk_size: 8 * 1024, // 8 KB
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            part_size: DEFAULT_PART_SIZE,
        }
    }
}

impl StageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let credentials = match (
            lookup("S3_ACCESS_KEY_ID"),
            lookup("S3_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => CredentialSource::Static {
                access_key_id,
                secret_access_key,
            },
            _ => default.credentials,
        };

        Self {
            region: default.region,

            endpoint_url: lookup("S3_ENDPOINT_URL").filter(|v| !v.trim().is_empty()),

            force_path_style: lookup("S3_FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.force_path_style),

            credentials,

            chunk_size: lookup("DOWNLOAD_CHUNK_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|size: &usize| *size > 0)
                .unwrap_or(default.chunk_size),

            multipart_threshold: lookup("S3_MULTIPART_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .filter(|size: &u64| *size > 0)
                .unwrap_or(default.multipart_threshold),

            part_size: lookup("S3_PART_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|size: &usize| *size >= MIN_PART_SIZE)
                .unwrap_or(default.part_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = StageConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.chunk_size, 8192);
        assert!(config.endpoint_url.is_none());
        assert!(!config.force_path_style);
        assert_eq!(config.credentials, CredentialSource::Ambient);
    }

    #[test]
    fn test_static_credentials_need_both_keys() {
        let config = StageConfig::from_lookup(lookup_from(&[("S3_ACCESS_KEY_ID", "minioadmin")]));
        assert_eq!(config.credentials, CredentialSource::Ambient);

        let config = StageConfig::from_lookup(lookup_from(&[
            ("S3_ACCESS_KEY_ID", "minioadmin"),
            ("S3_SECRET_ACCESS_KEY", "miniosecret"),
        ]));
        assert_eq!(
            config.credentials,
            CredentialSource::Static {
                access_key_id: "minioadmin".to_string(),
                secret_access_key: "miniosecret".to_string(),
            }
        );
    }

    #[test]
    fn test_endpoint_and_path_style() {
        let config = StageConfig::from_lookup(lookup_from(&[
            ("S3_ENDPOINT_URL", "http://127.0.0.1:9000"),
            ("S3_FORCE_PATH_STYLE", "TRUE"),
        ]));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(config.force_path_style);
    }

    #[test]
    fn test_invalid_chunk_size_falls_back() {
        let config = StageConfig::from_lookup(lookup_from(&[("DOWNLOAD_CHUNK_SIZE", "0")]));
        assert_eq!(config.chunk_size, 8192);

        let config = StageConfig::from_lookup(lookup_from(&[("DOWNLOAD_CHUNK_SIZE", "lots")]));
        assert_eq!(config.chunk_size, 8192);

        let config = StageConfig::from_lookup(lookup_from(&[("DOWNLOAD_CHUNK_SIZE", "65536")]));
        assert_eq!(config.chunk_size, 65536);
    }

    #[test]
    fn test_multipart_settings() {
        let config = StageConfig::default();
        assert_eq!(config.multipart_threshold, 8 * 1024 * 1024);
        assert_eq!(config.part_size, 8 * 1024 * 1024);

        let config = StageConfig::from_lookup(lookup_from(&[
            ("S3_MULTIPART_THRESHOLD", "104857600"),
            ("S3_PART_SIZE", "16777216"),
        ]));
        assert_eq!(config.multipart_threshold, 100 * 1024 * 1024);
        assert_eq!(config.part_size, 16 * 1024 * 1024);
    }

    #[test]
    fn test_part_size_below_s3_minimum_falls_back() {
        let config = StageConfig::from_lookup(lookup_from(&[("S3_PART_SIZE", "1024")]));
        assert_eq!(config.part_size, DEFAULT_PART_SIZE);
    }

    #[test]
    fn test_region_is_not_configurable() {
        let config = StageConfig::from_lookup(lookup_from(&[("AWS_REGION", "eu-west-1")]));
        assert_eq!(config.region, DEFAULT_REGION);
    }
}
