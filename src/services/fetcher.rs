use crate::error::StageError;
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Downloads a URL to a local file.
pub struct Fetcher {
    client: Client,
    chunk_size: usize,
}

impl Fetcher {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            client: Client::new(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Streams the body of `url` into `dest`, creating or overwriting it, and
    /// returns the number of bytes written.
    ///
    /// Anything other than `200 OK` is an error and leaves `dest` untouched.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, StageError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(StageError::RemoteFetch {
                url: url.to_string(),
                status,
            });
        }

        debug!(
            "GET {} -> {} (content-length: {:?})",
            url,
            status,
            response.content_length()
        );

        let file = File::create(dest).await?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            for piece in chunk.chunks(self.chunk_size) {
                writer.write_all(piece).await?;
            }
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        info!("📥 Downloaded {} bytes from {} to {}", written, url, dest.display());
        Ok(written)
    }
}
