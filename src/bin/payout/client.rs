//! Payout Allocation API Client
//!
//! Talks to a running `payout-server` under /api/v1/...

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use payout_allocation::server::{AllocationRequest, SplitAllocationRequest};
use payout_allocation::{AllocationResult, SplitAllocation};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Payout Allocation API client
pub struct AllocationClient {
    client: Client,
    base_url: String,
}

impl AllocationClient {
    /// Create a new client pointing to an allocation server
    pub fn new(server_url: &str) -> Self {
        // Build HTTP client with timeout, falling back to default client if builder fails
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/api/v1/{}", self.base_url, path)
    }

    pub async fn allocate(&self, request: &AllocationRequest) -> Result<AllocationResult> {
        self.post("allocation", request).await
    }

    pub async fn split_allocate(&self, request: &SplitAllocationRequest) -> Result<SplitAllocation> {
        self.post("split-allocation", request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self
            .client
            .post(self.api_url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to connect to allocation server: {}", e))?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let error: serde_json::Value = resp.json().await.unwrap_or_default();
            Err(anyhow!(
                "Allocation failed ({}): {}",
                status,
                error["error"].as_str().unwrap_or("Unknown error")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = AllocationClient::new("http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = AllocationClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_api_url() {
        let client = AllocationClient::new("http://localhost:8080");
        assert_eq!(
            client.api_url("/split-allocation"),
            "http://localhost:8080/api/v1/split-allocation"
        );
    }
}
