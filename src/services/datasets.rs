//! Datasets service for the Lumino SDK
//!
//! This module provides functionality for managing training datasets.
//! Datasets are uploaded from local files, can be listed, retrieved,
//! renamed, downloaded and deleted.

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{Dataset, DatasetCreate, DatasetUpdate, ListOptions, ListResponse};
use futures::StreamExt;
use reqwest::Response;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Service for managing datasets
#[derive(Clone)]
pub struct DatasetsService {
    /// HTTP client for making API requests
    http_client: HttpClient,
}

impl DatasetsService {
    /// Create a new datasets service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Upload a dataset file
    ///
    /// # Arguments
    ///
    /// * `file_path` - Local file to upload, usually JSONL
    /// * `request` - Name and optional description for the dataset
    ///
    /// # Returns
    ///
    /// The `Dataset` record created by the server
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()), level = "debug")]
    pub async fn upload(
        &self,
        file_path: impl AsRef<Path>,
        request: &DatasetCreate,
    ) -> Result<Dataset> {
        let file_path = file_path.as_ref();
        let file = tokio::fs::File::open(file_path).await?;
        let length = file.metadata().await?.len();
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("dataset.jsonl")
            .to_string();

        info!(
            "Uploading dataset {} from {} ({} bytes)",
            request.name,
            file_path.display(),
            length
        );

        let mut form = Form::new()
            .part("file", Part::stream_with_length(file, length).file_name(file_name))
            .text("name", request.name.clone());
        if let Some(description) = &request.description {
            form = form.text("description", description.clone());
        }

        self.http_client.post_multipart(&["datasets"], form).await
    }

    /// List datasets
    #[instrument(skip(self), level = "debug")]
    pub async fn list(&self, options: ListOptions) -> Result<ListResponse<Dataset>> {
        info!("Listing datasets (page {})", options.page);
        self.http_client
            .get_with_query(&["datasets"], &options)
            .await
    }

    /// Get a dataset by name
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, name: &str) -> Result<Dataset> {
        info!("Getting dataset: {}", name);
        self.http_client.get(&["datasets", name]).await
    }

    /// Update a dataset's name or description
    #[instrument(skip(self), level = "debug")]
    pub async fn update(&self, name: &str, update: &DatasetUpdate) -> Result<Dataset> {
        info!("Updating dataset: {}", name);
        self.http_client.patch(&["datasets", name], update).await
    }

    /// Delete a dataset
    #[instrument(skip(self), level = "debug")]
    pub async fn delete(&self, name: &str) -> Result<()> {
        info!("Deleting dataset: {}", name);
        self.http_client.delete_no_content(&["datasets", name]).await
    }

    /// Download a dataset's file to `output_path`, returning the number of
    /// bytes written
    ///
    /// The file is written next to `output_path` under a `.part` suffix and
    /// moved into place once complete. On failure the partial file is
    /// removed and any existing file at `output_path` is left untouched.
    #[instrument(skip(self, output_path), fields(path = %output_path.as_ref().display()), level = "debug")]
    pub async fn download(&self, name: &str, output_path: impl AsRef<Path>) -> Result<u64> {
        info!("Downloading dataset: {}", name);
        let output_path = output_path.as_ref();
        let response = self
            .http_client
            .get_stream(&["datasets", name, "download"])
            .await?;

        let partial = partial_path(output_path);
        let written = match write_body(response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                    debug!("Could not remove {}: {}", partial.display(), remove_err);
                }
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, output_path).await?;

        debug!("Wrote {} bytes to {}", written, output_path.display());
        Ok(written)
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}

async fn write_body(response: Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
