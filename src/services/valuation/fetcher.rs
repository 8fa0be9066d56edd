//! 新浪行情请求
//!
//! 每个批次发起一次 GET 请求，固定超时且不重试，
//! 失败只影响本批次，由调用方把该批代码记为缺失

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use thiserror::Error;

use crate::config::QuoteConfig;

use super::batch::QuoteBatch;

/// 批次请求错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求超时")]
    Timeout,
    #[error("HTTP 状态异常: {0}")]
    Status(u16),
    #[error("网络错误: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// 行情数据源
///
/// 返回批次对应的原始文本，测试中可替换为固定数据
pub trait QuoteSource: Send + Sync {
    fn fetch<'a>(&'a self, batch: &'a QuoteBatch) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// 新浪行情数据源
pub struct SinaQuoteSource {
    /// HTTP 客户端
    client: Client,
    endpoint: String,
    referer: String,
    user_agent: String,
    timeout: Duration,
}

impl SinaQuoteSource {
    pub fn new(config: &QuoteConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &QuoteConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// 批次请求地址：{endpoint}/list=sh600519,rt_hk00700,...
    pub fn batch_url(&self, batch: &QuoteBatch) -> String {
        format!("{}/list={}", self.endpoint, batch.symbols.join(","))
    }

    async fn request(&self, batch: &QuoteBatch) -> Result<String, FetchError> {
        let url = self.batch_url(batch);
        log::debug!("请求{}行情 URL: {}", batch.feed.name(), url);

        let response = self
            .client
            .get(&url)
            .header("Referer", &self.referer)
            .header("User-Agent", &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        // 新浪返回 GBK 编码
        let bytes = response.bytes().await?;
        Ok(encoding_rs::GBK.decode(&bytes).0.into_owned())
    }
}

impl QuoteSource for SinaQuoteSource {
    fn fetch<'a>(&'a self, batch: &'a QuoteBatch) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.request(batch))
    }
}
