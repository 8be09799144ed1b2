/// Media bucket configuration
use serde::{Deserialize, Serialize};

const DEFAULT_BUCKET: &str = "public-files";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket holding post files and avatars
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible storage
    pub endpoint_url: Option<String>,
    /// Base URL objects are publicly served from. When unset, URLs are
    /// derived from the endpoint (or AWS virtual-hosted style).
    pub public_base_url: Option<String>,
    /// Path-style addressing (`{endpoint}/{bucket}/{key}`)
    pub path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            public_base_url: None,
            path_style: false,
        }
    }
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok(),
            public_base_url: std::env::var("S3_PUBLIC_BASE_URL").ok(),
            path_style: std::env::var("S3_FORCE_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Public URL of an object in the bucket
    pub fn public_url(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        if let Some(base) = &self.public_base_url {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }
        match (&self.endpoint_url, self.path_style) {
            (Some(endpoint), true) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
            }
            (Some(endpoint), false) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), key)
            }
            (None, _) => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}
