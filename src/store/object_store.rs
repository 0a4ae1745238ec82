use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::store::{ObjectStore, UploadOptions};

/// HTTP client for the managed object storage API.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl StorageClient {
    pub fn new(base_url: &str, service_key: String, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid STORAGE_URL '{}': {}", base_url, e)))?;
        Ok(Self {
            client,
            base_url,
            service_key,
        })
    }

    fn object_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config("STORAGE_URL cannot be a base URL".to_string()))?;
            path.pop_if_empty().extend(["storage", "v1", "object"]);
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        options: UploadOptions,
    ) -> Result<()> {
        let url = self.object_url(&[bucket, path])?;
        let content_type = options
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let size = bytes.len();

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(bucket, path, %status, "Object upload rejected");
            return Err(Error::Store(format!(
                "Upload of {}/{} failed with {}: {}",
                bucket, path, status, body
            )));
        }

        info!(bucket, path, size, "Object uploaded");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        Ok(self.object_url(&["public", bucket, path])?.to_string())
    }
}
