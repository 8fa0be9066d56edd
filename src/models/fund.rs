//! 基金与持仓数据模型
//!
//! 定义市场、持仓、基金等一次估值计算的输入结构

use serde::{Deserialize, Serialize};
use std::fmt;

/// 持仓所属市场
///
/// 决定行情查询代码的构造规则以及返回数据的解析格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// 上交所
    Sh,
    /// 深交所
    Sz,
    /// 北交所
    Bj,
    /// 港股
    Hk,
    /// 美股
    Us,
}

impl Market {
    /// 快照文件中使用的市场代码
    pub fn code(&self) -> &'static str {
        match self {
            Market::Sh => "sh",
            Market::Sz => "sz",
            Market::Bj => "bj",
            Market::Hk => "hk",
            Market::Us => "us",
        }
    }

    /// 从市场代码解析（不区分大小写），未知市场返回 None
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "sh" => Some(Market::Sh),
            "sz" => Some(Market::Sz),
            "bj" => Some(Market::Bj),
            "hk" => Some(Market::Hk),
            "us" => Some(Market::Us),
            _ => None,
        }
    }

    /// 该市场行情所在的数据板块
    pub fn feed(&self) -> QuoteFeed {
        match self {
            Market::Sh | Market::Sz | Market::Bj => QuoteFeed::AShare,
            Market::Hk => QuoteFeed::HongKong,
            Market::Us => QuoteFeed::Us,
        }
    }

    pub fn is_overseas(&self) -> bool {
        matches!(self, Market::Hk | Market::Us)
    }

    /// 持仓详情中的市场标记
    pub fn detail_tag(&self) -> &'static str {
        match self {
            Market::Hk => "(港)",
            Market::Us => "(美)",
            Market::Bj => "(北)",
            _ => "",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 行情数据板块
///
/// 同一板块的返回格式一致，可合并到同一批请求中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteFeed {
    /// 沪深北 A 股：字段 2 为昨收，字段 3 为现价
    AShare,
    /// 港股：字段 8 为涨跌幅
    HongKong,
    /// 美股：字段 2 为涨跌幅
    Us,
}

impl QuoteFeed {
    pub fn name(&self) -> &'static str {
        match self {
            QuoteFeed::AShare => "A股",
            QuoteFeed::HongKong => "港股",
            QuoteFeed::Us => "美股",
        }
    }
}

/// 持仓数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// 网络爬取
    #[default]
    Scraped,
    /// 通过替身基金获取
    Proxy,
    /// 手动录入
    Manual,
}

impl Provenance {
    /// 展示用的来源标注，爬取数据不标注
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Provenance::Scraped => None,
            Provenance::Proxy => Some("替身"),
            Provenance::Manual => Some("手动"),
        }
    }
}

/// 基金的一项披露持仓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// 证券代码
    pub code: String,
    /// 证券名称
    pub name: String,
    /// 所属市场（无法识别时为 None，不参与行情查询）
    pub market: Option<Market>,
    /// 占净值比例（百分比）
    pub weight: f64,
}

/// 基金
///
/// 持仓归基金独占，不同基金持有同一股票时各自保留一份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fund {
    /// 基金代码
    pub id: String,
    /// 基金名称
    pub display_name: String,
    /// 持仓来源
    pub provenance: Provenance,
    /// 持仓列表（保持快照中的顺序）
    pub holdings: Vec<Holding>,
}
