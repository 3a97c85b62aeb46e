use std::fmt;

/// A stored object: the bucket plus the key it lives under.
///
/// The pipeline builds one of these per run and hands the same value to the
/// upload and the signing step, so both always address the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn s3_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.s3_uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_uri() {
        let location = ObjectLocation::new("my-bucket", "data.csv");
        assert_eq!(location.s3_uri(), "s3://my-bucket/data.csv");
        assert_eq!(location.to_string(), location.s3_uri());
    }
}
