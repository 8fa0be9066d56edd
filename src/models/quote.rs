//! 行情结果模型

use serde::{Deserialize, Serialize};
use std::fmt;

use super::fund::Market;

/// 证券的内部标识：(市场, 代码)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentId {
    pub market: Market,
    pub code: String,
}

impl InstrumentId {
    pub fn new(market: Market, code: impl Into<String>) -> Self {
        Self {
            market,
            code: code.into(),
        }
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.market, self.code)
    }
}

/// 行情质量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteQuality {
    /// 成功取得行情
    Ok,
    /// 无数据或所在批次请求失败
    Missing,
}

/// 单只证券的涨跌幅行情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub id: InstrumentId,
    /// 涨跌幅（百分比）
    pub percent_change: f64,
    pub quality: QuoteQuality,
}

impl QuoteResult {
    pub fn ok(id: InstrumentId, percent_change: f64) -> Self {
        Self {
            id,
            percent_change,
            quality: QuoteQuality::Ok,
        }
    }

    pub fn missing(id: InstrumentId) -> Self {
        Self {
            id,
            percent_change: 0.0,
            quality: QuoteQuality::Missing,
        }
    }
}
