mod config;
mod db;
mod documents;
mod encode;
mod errors;
mod generation;
mod llm_client;
mod models;
mod providers;
mod render;
mod routes;
mod state;
mod storage;

#[cfg(test)]
mod testing;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, StorageConfig};
use crate::db::create_pool;
use crate::documents::{DocumentStore, PgArtifactRepository};
use crate::encode::FormatEncoder;
use crate::generation::{DocumentPipeline, GenerationService};
use crate::llm_client::LlmClient;
use crate::providers::PgProviders;
use crate::render::TemplateRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{BlobStorage, LocalBlobStorage, S3BlobStorage};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dossier API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize blob storage
    let blobs = build_blob_storage(&config.storage).await?;
    info!("Blob storage initialized (backend: {})", blobs.backend_name());

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let repository = Arc::new(PgArtifactRepository::new(db.clone()));
    let store = Arc::new(DocumentStore::new(repository, blobs));

    let pipeline = DocumentPipeline::new(
        llm,
        TemplateRenderer::new()?,
        FormatEncoder::new(),
        store.clone(),
    );
    let providers = Arc::new(PgProviders::new(db));
    let generation = GenerationService::new(providers.clone(), providers, pipeline);

    let state = AppState {
        generation: Arc::new(generation),
        store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the blob backend named by `STORAGE_BACKEND`.
async fn build_blob_storage(storage: &StorageConfig) -> Result<Arc<dyn BlobStorage>> {
    match storage {
        StorageConfig::Local { path } => {
            let local = LocalBlobStorage::new(path.clone()).await?;
            Ok(Arc::new(local))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            access_key_id,
            secret_access_key,
        } => {
            let client = build_s3_client(endpoint, access_key_id, secret_access_key).await;
            Ok(Arc::new(S3BlobStorage::new(client, bucket.clone())))
        }
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(
    endpoint: &str,
    access_key_id: &str,
    secret_access_key: &str,
) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        "dossier-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by subdomain
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
