use clap::Parser;
use dotenvy::dotenv;
use stage_presign::config::{DEFAULT_EXPIRATION_SECS, StageConfig};
use stage_presign::infrastructure::storage;
use stage_presign::{Fetcher, StageRequest, StagingPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Download a file, upload it to S3, and generate a presigned URL."
)]
struct Args {
    /// URL of the file to download
    file_url: String,

    /// Name of the S3 bucket
    bucket_name: String,

    /// Presigned URL expiration time in seconds (default: 7 days)
    #[arg(long, default_value_t = DEFAULT_EXPIRATION_SECS, allow_negative_numbers = true)]
    expiration: i64,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr; stdout carries progress and the URL.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stage_presign=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = StageConfig::from_env();
    info!(
        "🛠️  Config: Region={}, Endpoint={:?}, Chunk={}B",
        config.region, config.endpoint_url, config.chunk_size
    );

    let store = Arc::new(storage::setup_storage(&config).await);
    let pipeline = StagingPipeline::new(Fetcher::new(config.chunk_size), store);

    let request = StageRequest {
        file_url: args.file_url,
        bucket: args.bucket_name,
        expiration_secs: args.expiration,
        work_dir: PathBuf::from("."),
    };

    let mut stdout = std::io::stdout();
    match pipeline.run(&request, &mut stdout).await {
        Ok(outcome) => {
            println!(
                "🔗 Presigned URL (expires in {} seconds):\n{}",
                outcome.expiration.as_secs(),
                outcome.url
            );
        }
        Err(e) => {
            error!("❌ Staging failed: {:?}", e);
            if e.is_fetch_failure() {
                info!("Nothing was uploaded to s3://{}/", request.bucket);
            }
            println!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
