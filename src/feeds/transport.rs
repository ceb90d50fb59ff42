//! HTTP seam for feed fetching.

use std::future::Future;

use anyhow::Result;

/// Fetches a URL and returns the body text. Non-2xx responses are errors.
pub trait FeedTransport: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use anyhow::{anyhow, Result};
    use log::debug;

    use super::FeedTransport;

    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        pub fn new() -> Self {
            Self {
                client: reqwest::Client::new(),
            }
        }
    }

    impl FeedTransport for HttpTransport {
        async fn get(&self, url: &str) -> Result<String> {
            debug!("Fetching feed via: {}", url);
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

            if !response.status().is_success() {
                return Err(anyhow!("Proxy returned status: {}", response.status()));
            }

            response
                .text()
                .await
                .map_err(|e| anyhow!("Failed to read response body: {}", e))
        }
    }
}
