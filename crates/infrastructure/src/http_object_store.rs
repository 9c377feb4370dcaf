use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use s3commander_application::{BucketSummary, ObjectStoreClient, ObjectSummary, PresignedUrl};
use s3commander_core::{AppError, AppResult};
use s3commander_domain::BucketName;

/// HTTP client for the object-storage gateway.
///
/// The gateway fronts the actual S3-compatible store and holds its
/// credentials; the portal only carries a bearer token for the gateway.
pub struct HttpObjectStoreClient {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: String,
}

impl HttpObjectStoreClient {
    /// Creates a gateway client against `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url, bearer_token: String) -> Self {
        Self {
            http_client,
            base_url,
            bearer_token,
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("invalid storage gateway endpoint '{path}': {error}"))
        })
    }

    async fn get_json<T>(&self, url: Url, context: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, "calling storage gateway");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.bearer_token.as_str())
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("storage gateway transport error ({context}): {error}"))
            })?;

        Self::decode_response(response, context).await
    }

    async fn post_json<T>(&self, url: Url, context: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, "calling storage gateway");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.bearer_token.as_str())
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("storage gateway transport error ({context}): {error}"))
            })?;

        Self::decode_response(response, context).await
    }

    async fn decode_response<T>(response: reqwest::Response, context: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{context} was not found")));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "storage gateway returned status {status} ({context}): {body}"
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Internal(format!(
                "storage gateway returned malformed payload ({context}): {error}"
            ))
        })
    }
}

#[derive(Deserialize)]
struct GatewayBucket {
    name: String,
    region: String,
}

#[derive(Deserialize)]
struct GatewayObject {
    key: String,
    size_bytes: u64,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GatewayPresignedUrl {
    url: String,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl ObjectStoreClient for HttpObjectStoreClient {
    async fn list_buckets(&self) -> AppResult<Vec<BucketSummary>> {
        let url = self.endpoint("v1/buckets")?;
        let buckets: Vec<GatewayBucket> = self.get_json(url, "bucket listing").await?;

        Ok(buckets
            .into_iter()
            .map(|bucket| BucketSummary {
                name: bucket.name,
                region: bucket.region,
            })
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> AppResult<Vec<ObjectSummary>> {
        let mut url = self.endpoint(&format!("v1/buckets/{bucket}/objects"))?;
        if let Some(prefix) = prefix {
            url.query_pairs_mut().append_pair("prefix", prefix);
        }

        let objects: Vec<GatewayObject> = self
            .get_json(url, &format!("object listing for bucket '{bucket}'"))
            .await?;

        Ok(objects
            .into_iter()
            .map(|object| ObjectSummary {
                key: object.key,
                size_bytes: object.size_bytes,
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn presign_download(&self, bucket: &BucketName, key: &str) -> AppResult<PresignedUrl> {
        let mut url = self.endpoint(&format!("v1/buckets/{bucket}/presign/download"))?;
        url.query_pairs_mut().append_pair("key", key);

        let presigned: GatewayPresignedUrl = self
            .post_json(url, &format!("download URL for '{bucket}/{key}'"))
            .await?;

        Ok(PresignedUrl {
            url: presigned.url,
            expires_at: presigned.expires_at,
        })
    }

    async fn presign_upload(&self, bucket: &BucketName, key: &str) -> AppResult<PresignedUrl> {
        let mut url = self.endpoint(&format!("v1/buckets/{bucket}/presign/upload"))?;
        url.query_pairs_mut().append_pair("key", key);

        let presigned: GatewayPresignedUrl = self
            .post_json(url, &format!("upload URL for '{bucket}/{key}'"))
            .await?;

        Ok(PresignedUrl {
            url: presigned.url,
            expires_at: presigned.expires_at,
        })
    }

    async fn delete_object(&self, bucket: &BucketName, key: &str) -> AppResult<()> {
        let mut url = self.endpoint(&format!("v1/buckets/{bucket}/objects"))?;
        url.query_pairs_mut().append_pair("key", key);

        tracing::debug!(url = %url, "calling storage gateway");

        let response = self
            .http_client
            .delete(url)
            .bearer_auth(self.bearer_token.as_str())
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "storage gateway transport error (object deletion): {error}"
                ))
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "object '{bucket}/{key}' was not found"
            )));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "storage gateway returned status {status} (object deletion): {body}"
            )));
        }

        Ok(())
    }
}
