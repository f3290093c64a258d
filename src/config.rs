use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/upload";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Multipart field that carries the image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

impl UploadConfig {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid upload endpoint {endpoint}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Upload endpoint must use http or https, got {}",
                endpoint.scheme()
            ));
        }
        if timeout_secs == 0 {
            return Err(anyhow!("Timeout must be at least one second"));
        }
        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
