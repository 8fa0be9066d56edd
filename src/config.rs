//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::valuation::{
    BROWSER_USER_AGENT, DEFAULT_BATCH_SIZE, DEFAULT_COVERAGE_THRESHOLD, DEFAULT_DETAIL_LIMIT,
    DEFAULT_DOMESTIC_RATIO, DEFAULT_MAX_CONCURRENCY, DEFAULT_OVERSEAS_RATIO, DEFAULT_TIMEOUT_SECS,
    SINA_QUOTE_API, SINA_REFERER,
};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 行情请求配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// 行情接口地址
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Referer 请求头
    #[serde(default = "default_referer")]
    pub referer: String,
    /// User-Agent 请求头
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// 单批请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 每批最多代码数
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// 最大并发批次数
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

/// 估值策略配置
///
/// 阈值与仓位系数均为经验值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// 权重合计超过该值才按仓位外推
    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: f64,
    /// A 股基金仓位系数
    #[serde(default = "default_domestic_ratio")]
    pub domestic_ratio: f64,
    /// 港股 / QDII 基金仓位系数
    #[serde(default = "default_overseas_ratio")]
    pub overseas_ratio: f64,
    /// 重仓透视展示的持仓数
    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,
}

/// 数据文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// 持仓快照路径
    #[serde(default = "default_holdings_path")]
    pub holdings_path: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 行情配置
    #[serde(default)]
    pub quote: QuoteConfig,
    /// 估值配置
    #[serde(default)]
    pub valuation: ValuationConfig,
    /// 数据文件配置
    #[serde(default)]
    pub data: DataConfig,
    /// 配置来源文件（未找到时为 None）
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_log_level() -> String { "info".to_string() }
fn default_endpoint() -> String { SINA_QUOTE_API.to_string() }
fn default_referer() -> String { SINA_REFERER.to_string() }
fn default_user_agent() -> String { BROWSER_USER_AGENT.to_string() }
fn default_timeout() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_batch_size() -> usize { DEFAULT_BATCH_SIZE }
fn default_max_concurrency() -> usize { DEFAULT_MAX_CONCURRENCY }
fn default_coverage_threshold() -> f64 { DEFAULT_COVERAGE_THRESHOLD }
fn default_domestic_ratio() -> f64 { DEFAULT_DOMESTIC_RATIO }
fn default_overseas_ratio() -> f64 { DEFAULT_OVERSEAS_RATIO }
fn default_detail_limit() -> usize { DEFAULT_DETAIL_LIMIT }
fn default_holdings_path() -> String { "holdings.json".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            batch_size: default_batch_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: default_coverage_threshold(),
            domestic_ratio: default_domestic_ratio(),
            overseas_ratio: default_overseas_ratio(),
            detail_limit: default_detail_limit(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            holdings_path: default_holdings_path(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        config.loaded_from = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 此时日志尚未初始化，失败原因通过返回值带出
    pub fn load() -> (Self, Vec<String>) {
        let config_paths = ["config.json", "config/config.json"];
        let mut warnings = Vec::new();

        let mut config = config_paths
            .iter()
            .filter(|path| Path::new(path).exists())
            .find_map(|path| match Self::from_file(path) {
                Ok(config) => Some(config),
                Err(e) => {
                    warnings.push(format!("加载配置文件 {} 失败: {}", path, e));
                    None
                }
            })
            .unwrap_or_default();

        if let Ok(key) = std::env::var("API_KEY") {
            config.api.api_key = key;
        }

        (config, warnings)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<()> {
        if self.quote.batch_size == 0 {
            bail!("quote.batch_size 必须大于 0");
        }
        if self.quote.max_concurrency == 0 {
            bail!("quote.max_concurrency 必须大于 0");
        }
        if self.quote.timeout_secs == 0 {
            bail!("quote.timeout_secs 必须大于 0");
        }

        let v = &self.valuation;
        for (name, value) in [
            ("coverage_threshold", v.coverage_threshold),
            ("domestic_ratio", v.domestic_ratio),
            ("overseas_ratio", v.overseas_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("valuation.{} 取值无效: {}", name, value);
            }
        }
        Ok(())
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.quote.batch_size, 80);
        assert_eq!(config.quote.timeout_secs, 3);
        assert_eq!(config.valuation.coverage_threshold, 50.0);
        assert_eq!(config.valuation.domestic_ratio, 0.88);
        assert_eq!(config.valuation.overseas_ratio, 0.95);
        assert_eq!(config.data.holdings_path, "holdings.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "server": {"port": 9000},
            "valuation": {"domestic_ratio": 0.9},
            "quote": {"max_concurrency": 2}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.valuation.domestic_ratio, 0.9);
        assert_eq!(config.valuation.overseas_ratio, 0.95);
        assert_eq!(config.quote.max_concurrency, 2);
        assert_eq!(config.quote.endpoint, "https://hq.sinajs.cn");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.quote.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.valuation.overseas_ratio = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.valuation.coverage_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }
}
