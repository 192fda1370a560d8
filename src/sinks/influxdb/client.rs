//! InfluxDB v2 HTTP 客户端
//!
//! 只覆盖日志写入需要的三个端点：`/health`、`/ping` 与 `/api/v2/write`。

use crate::config::{InfluxConfig, InfluxOptions};
use crate::error::{PrismLogError, Result};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// 补全协议前缀并去掉末尾的 `/`
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    let (scheme, host) = match address.strip_prefix("https://") {
        Some(host) => ("https://", host),
        None => ("http://", address.strip_prefix("http://").unwrap_or(address)),
    };
    format!("{}{}", scheme, host.trim_end_matches('/'))
}

/// InfluxDB HTTP 客户端
#[derive(Clone)]
pub struct InfluxClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    organization: String,
    bucket: String,
}

impl InfluxClient {
    pub fn new(config: &InfluxConfig, options: &InfluxOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_seconds))
            .build()
            .map_err(|e| PrismLogError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: normalize_address(config.address()),
            auth_header: format!("Token {}", config.auth_token()),
            organization: config.organization().to_string(),
            bucket: config.bucket().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`：状态码必须成功，且响应不能报告 `"status": "fail"`
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PrismLogError::health_check(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PrismLogError::health_check(format!(
                "GET {} returned {}: {}",
                url, status, body
            )));
        }

        if let Ok(report) = serde_json::from_str::<serde_json::Value>(&body) {
            if report.get("status").and_then(|s| s.as_str()) == Some("fail") {
                return Err(PrismLogError::health_check(format!(
                    "InfluxDB reports unhealthy: {}",
                    report
                        .get("message")
                        .and_then(|m| m.as_str())
                        .unwrap_or("no message")
                )));
            }
        }

        debug!("InfluxDB health check passed: {}", url);
        Ok(())
    }

    /// `GET /ping`
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/ping", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PrismLogError::health_check(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(PrismLogError::health_check(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        debug!("InfluxDB ping succeeded: {}", url);
        Ok(())
    }

    /// 写入一批行协议数据
    pub async fn write(&self, body: String) -> Result<()> {
        let url = format!("{}/api/v2/write", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[
                ("org", self.organization.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, self.auth_header.as_str())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| PrismLogError::network(format!("Failed to send data to InfluxDB: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrismLogError::network(format!(
                "InfluxDB write failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for InfluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxClient")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("localhost:8086"), "http://localhost:8086");
        assert_eq!(normalize_address("http://db:8086/"), "http://db:8086");
        assert_eq!(normalize_address("https://cloud.example.com"), "https://cloud.example.com");
        assert_eq!(normalize_address(""), "http://");
        assert_eq!(normalize_address("/"), "http://");
        assert_eq!(normalize_address("http://"), "http://");
        assert_eq!(normalize_address(" db:8086// "), "http://db:8086");
    }

    #[test]
    fn test_client_debug_hides_token() {
        let config = InfluxConfig::new("db:8086", "secret-token", "org", "bucket");
        let client = InfluxClient::new(&config, &InfluxOptions::default()).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert_eq!(client.base_url(), "http://db:8086");
    }
}
