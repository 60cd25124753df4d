use log::debug;
use url::Url;

use super::ObjectStore;
use crate::{
    RegistryErr, Result,
    http::{self, MAX_OBJECT_BYTES},
};

/// A Google Cloud Storage bucket, reached through the JSON API.
///
/// Requests carry `Authorization: Bearer <token>` when a token is given. Obtaining or refreshing
/// that token is up to the caller.
#[derive(Debug, Clone)]
pub struct GcsStore {
    endpoint: Url,
    bucket: String,
    token: Option<String>,
}

impl GcsStore {
    pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

    /// Creates a new `GcsStore`.
    ///
    /// # Arguments
    /// * `endpoint` - The API base URL, `DEFAULT_ENDPOINT` unless talking to an emulator.
    /// * `bucket` - The bucket name.
    /// * `token` - An optional OAuth2 access token.
    ///
    /// # Returns
    /// A new `GcsStore` or an error if `endpoint` is not a base URL.
    pub fn new(endpoint: &str, bucket: impl Into<String>, token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(RegistryErr::InvalidEndpoint(endpoint.to_string()));
        }

        Ok(Self {
            endpoint,
            bucket: bucket.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// `{endpoint}/storage/v1/b/{bucket}/o/{key}?alt=media`
    fn download_url(&self, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        // SAFETY: `new` rejects endpoints that cannot be a base.
        url.path_segments_mut()
            .unwrap()
            .pop_if_empty()
            .extend(["storage", "v1", "b", &self.bucket, "o", key]);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }

    /// `{endpoint}/upload/storage/v1/b/{bucket}/o?uploadType=media&name={key}`
    fn upload_url(&self, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        // SAFETY: `new` rejects endpoints that cannot be a base.
        url.path_segments_mut()
            .unwrap()
            .pop_if_empty()
            .extend(["upload", "storage", "v1", "b", &self.bucket, "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        url
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token.trim())),
            None => request,
        }
    }
}

impl ObjectStore for GcsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let url = self.download_url(key);
        debug!("GET {url}");

        let request = self.authorize(http::agent().request_url("GET", &url));
        let Some(response) = http::send(true, || request.call())? else {
            return Ok(None);
        };

        let bytes = http::read_response_bytes(response, MAX_OBJECT_BYTES)?;
        Ok(Some(bytes))
    }

    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let url = self.upload_url(key);
        debug!(len = bytes.len(); "POST {url}");

        let request = self
            .authorize(http::agent().request_url("POST", &url))
            .set("Content-Type", content_type);
        http::send(false, || request.send_bytes(bytes))?;

        Ok(())
    }

    fn uri(&self, key: &str) -> String {
        format!("gs://{}/{key}", self.bucket)
    }
}
