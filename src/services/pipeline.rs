use crate::error::StageError;
use crate::models::ObjectLocation;
use crate::services::fetcher::Fetcher;
use crate::services::storage::ObjectStore;
use crate::utils::filename::local_filename;
use crate::utils::validation::Expiration;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct StageRequest {
    pub file_url: String,
    pub bucket: String,
    /// Raw `--expiration` value; validated before anything is downloaded.
    pub expiration_secs: i64,
    /// Directory the downloaded file is written to.
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub local_path: PathBuf,
    pub location: ObjectLocation,
    pub bytes: u64,
    pub url: String,
    pub expiration: Expiration,
}

/// Download, upload, sign. Each step runs only after the previous one
/// succeeded; the first error ends the run.
pub struct StagingPipeline {
    fetcher: Fetcher,
    store: Arc<dyn ObjectStore>,
}

impl StagingPipeline {
    pub fn new(fetcher: Fetcher, store: Arc<dyn ObjectStore>) -> Self {
        Self { fetcher, store }
    }

    /// Runs all three steps, writing one progress line per step to `out`.
    ///
    /// The downloaded file is left in `work_dir`. Nothing is rolled back on
    /// failure: an object uploaded before a signing error stays in the bucket.
    pub async fn run(
        &self,
        request: &StageRequest,
        out: &mut (dyn Write + Send),
    ) -> Result<StageOutcome, StageError> {
        let expiration = Expiration::new(request.expiration_secs)?;
        let filename = local_filename(&request.file_url)?;
        let local_path = request.work_dir.join(&filename);
        let location = ObjectLocation::new(request.bucket.clone(), filename.clone());

        // 1. Fetch
        writeln!(out, "Downloading file from {}...", request.file_url)?;
        let bytes = self
            .fetcher
            .download(&request.file_url, &local_path)
            .await?;
        writeln!(out, "Downloaded: {} ({} bytes)", filename, bytes)?;

        // 2. Upload
        writeln!(out, "Uploading {} to s3://{}/ ...", filename, location.bucket)?;
        self.store.upload_file(&location, &local_path).await?;
        writeln!(out, "File uploaded to {}", location)?;
        info!("☁️  Uploaded {} ({} bytes)", location, bytes);

        // 3. Sign
        let url = self.store.presign_get(&location, expiration).await?;
        info!(
            "🔗 Presigned GET for {} valid for {}s",
            location,
            expiration.as_secs()
        );

        Ok(StageOutcome {
            local_path,
            location,
            bytes,
            url,
            expiration,
        })
    }
}
