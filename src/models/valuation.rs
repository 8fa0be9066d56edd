//! 估值结果模型
//!
//! 每次请求重新计算，不做持久化

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::fund::{Market, Provenance};
use super::quote::QuoteQuality;

/// 基金类型标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationTag {
    /// A 股基金
    Domestic,
    /// 含港股持仓
    OverseasHk,
    /// 含美股持仓
    OverseasUs,
}

impl ValuationTag {
    pub fn is_overseas(&self) -> bool {
        !matches!(self, ValuationTag::Domestic)
    }
}

/// 单项持仓的估值明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingDetail {
    pub code: String,
    pub name: String,
    pub market: Option<Market>,
    /// 占净值比例（百分比）
    pub weight: f64,
    /// 涨跌幅（百分比），缺失行情按 0 计
    pub percent_change: f64,
    pub quality: QuoteQuality,
}

/// 单只基金的估值结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// 基金代码
    pub fund_id: String,
    /// 基金名称
    pub display_name: String,
    /// 估算涨跌幅（百分比）
    pub estimated_percent_change: f64,
    /// 类型标记
    pub tag: ValuationTag,
    /// 持仓来源
    pub provenance: Provenance,
    /// 来源标注（手动 / 替身）
    pub provenance_tag: Option<String>,
    /// 披露持仓的权重合计
    pub total_weight: f64,
    /// 已披露持仓的加权涨跌幅（未修正）
    pub weighted_sum: f64,
    /// 重仓透视文字
    pub detail_text: String,
    /// 持仓明细
    pub holdings: Vec<HoldingDetail>,
}

/// 单次估值的统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassStats {
    pub funds: usize,
    pub distinct_symbols: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub quotes: usize,
    pub elapsed_ms: u64,
    /// 计算时间（北京时间）
    pub generated_at: String,
}

/// 估值看板：按展示需要分组后的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationBoard {
    /// 全部基金，按估算涨跌幅降序
    pub all: Vec<ValuationResult>,
    /// 上涨
    pub gainers: Vec<ValuationResult>,
    /// 下跌
    pub losers: Vec<ValuationResult>,
    /// QDII / 港股类
    pub overseas: Vec<ValuationResult>,
    pub stats: PassStats,
}

impl ValuationBoard {
    pub fn bucket(&self, bucket: Bucket) -> &[ValuationResult] {
        match bucket {
            Bucket::All => &self.all,
            Bucket::Gainers => &self.gainers,
            Bucket::Losers => &self.losers,
            Bucket::Overseas => &self.overseas,
        }
    }
}

/// 看板分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    All,
    Gainers,
    Losers,
    Overseas,
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Bucket::All),
            "gainers" => Ok(Bucket::Gainers),
            "losers" => Ok(Bucket::Losers),
            "overseas" => Ok(Bucket::Overseas),
            other => Err(format!("未知分组: {}，可选 all/gainers/losers/overseas", other)),
        }
    }
}

/// 估值查询参数
#[derive(Debug, Deserialize)]
pub struct ValuationQuery {
    /// 只返回指定分组
    pub bucket: Option<String>,
}
