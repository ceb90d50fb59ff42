//! Proxy strategies for reaching feeds that cannot be fetched directly.
//!
//! Each strategy answers two questions the same way: how to build the
//! request URL for a target feed, and how to get the feed body back out of
//! the proxy's response.

use anyhow::{anyhow, Result};

use crate::config::{ProxyConfig, ProxyEnvelope, ProxyRequestStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyStrategy {
    pub name: String,
    base: String,
    request: ProxyRequestStyle,
    envelope: ProxyEnvelope,
}

impl From<&ProxyConfig> for ProxyStrategy {
    fn from(config: &ProxyConfig) -> Self {
        Self {
            name: config.name.clone(),
            base: config.base.clone(),
            request: config.request,
            envelope: config.response.clone(),
        }
    }
}

impl ProxyStrategy {
    pub fn build_url(&self, target: &str) -> String {
        match self.request {
            ProxyRequestStyle::QueryParam => {
                format!("{}{}", self.base, urlencoding::encode(target))
            }
            ProxyRequestStyle::PathConcat => format!("{}{}", self.base, target),
        }
    }

    /// Extract the upstream feed body from the proxy response text.
    pub fn unwrap_body(&self, text: &str) -> Result<String> {
        let body = match &self.envelope {
            ProxyEnvelope::Raw => text.to_string(),
            ProxyEnvelope::Json(field) => {
                let value: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| anyhow!("{}: invalid JSON envelope: {}", self.name, e))?;
                value
                    .get(field)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow!("{}: envelope has no string field '{}'", self.name, field))?
                    .to_string()
            }
        };
        if body.trim().is_empty() {
            return Err(anyhow!("{}: empty body", self.name));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(request: ProxyRequestStyle, envelope: ProxyEnvelope) -> ProxyStrategy {
        ProxyStrategy::from(&ProxyConfig {
            name: "test".to_string(),
            base: "https://proxy.example/?u=".to_string(),
            request,
            response: envelope,
        })
    }

    #[test]
    fn query_param_encodes_target() {
        let s = strategy(ProxyRequestStyle::QueryParam, ProxyEnvelope::Raw);
        assert_eq!(
            s.build_url("https://feeds.example/rss?x=1&y=2"),
            "https://proxy.example/?u=https%3A%2F%2Ffeeds.example%2Frss%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn path_concat_appends_verbatim() {
        let s = strategy(ProxyRequestStyle::PathConcat, ProxyEnvelope::Raw);
        assert_eq!(
            s.build_url("https://feeds.example/rss"),
            "https://proxy.example/?u=https://feeds.example/rss"
        );
    }

    #[test]
    fn json_envelope_unwraps_named_field() {
        let s = strategy(
            ProxyRequestStyle::QueryParam,
            ProxyEnvelope::Json("contents".to_string()),
        );
        let body = s
            .unwrap_body(r#"{"contents":"<rss><item></item></rss>","status":{"http_code":200}}"#)
            .unwrap();
        assert_eq!(body, "<rss><item></item></rss>");
        assert!(s.unwrap_body(r#"{"contents":null}"#).is_err());
        assert!(s.unwrap_body("<rss/>").is_err());
    }

    #[test]
    fn empty_raw_body_is_a_failure() {
        let s = strategy(ProxyRequestStyle::PathConcat, ProxyEnvelope::Raw);
        assert!(s.unwrap_body("   \n").is_err());
    }
}
