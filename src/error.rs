use crate::models::ObjectLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Unable to download file from {url}: server responded with {status}")]
    RemoteFetch {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Unable to download file: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid source URL '{url}': {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    #[error("Invalid expiration {0}: must be between 1 and 604800 seconds")]
    InvalidExpiration(i64),

    #[error("Error uploading file to {location}: {message}")]
    Upload {
        location: ObjectLocation,
        message: String,
    },

    #[error("Error generating presigned URL for {location}: {message}")]
    Sign {
        location: ObjectLocation,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError {
    /// Every failure is terminal; the CLI maps all of them to the same status.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True when the error was raised before anything reached the bucket.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            StageError::RemoteFetch { .. }
                | StageError::Request(_)
                | StageError::InvalidSourceUrl { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_fetch_message_names_url_and_status() {
        let err = StageError::RemoteFetch {
            url: "https://example.com/data.csv".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/data.csv"));
        assert!(msg.contains("404"));
        assert!(err.is_fetch_failure());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_upload_message_names_s3_uri() {
        let err = StageError::Upload {
            location: ObjectLocation::new("my-bucket", "data.csv"),
            message: "AccessDenied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error uploading file to s3://my-bucket/data.csv: AccessDenied"
        );
        assert!(!err.is_fetch_failure());
    }
}
