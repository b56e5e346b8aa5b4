use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::remote::BlobStore;

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    paths: &'a [String],
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignedObject {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// Blob gateway for the attachments bucket.
pub struct RestBlobs {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl RestBlobs {
    pub fn new(base_url: String, api_key: String, bucket: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            api_key,
            bucket,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, action, self.bucket)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn ensure_success(response: Response, what: &str) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AppError::Remote(format!("{what}: {status} {body}")))
        }
    }
}

#[async_trait]
impl BlobStore for RestBlobs {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let response = self
            .authed(self.client.post(self.endpoint("list")))
            .json(&ListRequest {
                prefix,
                limit: 10_000,
            })
            .send()
            .await?;
        let objects: Vec<ListedObject> = Self::ensure_success(response, "list attachments")
            .await?
            .json()
            .await?;
        Ok(objects.into_iter().map(|o| o.name).collect())
    }

    async fn sign_many(&self, paths: &[String], ttl_secs: u64) -> Result<Vec<String>> {
        let response = self
            .authed(self.client.post(self.endpoint("sign")))
            .json(&SignRequest {
                paths,
                expires_in: ttl_secs,
            })
            .send()
            .await?;
        let signed: Vec<SignedObject> = Self::ensure_success(response, "sign attachment urls")
            .await?
            .json()
            .await?;
        Ok(signed.into_iter().map(|s| s.signed_url).collect())
    }

    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        let response = self
            .authed(self.client.post(url))
            .header("content-type", content_type.to_string())
            .body(bytes)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(AppError::Remote(format!(
                "upload attachment: '{path}' already exists"
            )));
        }
        Self::ensure_success(response, "upload attachment").await?;
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .authed(self.client.delete(url))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;
        Self::ensure_success(response, "remove attachments").await?;
        Ok(())
    }
}
