//! 基金实时估值服务
//!
//! 根据基金披露的重仓股和新浪实时行情估算基金当日涨跌幅
//!
//! ## 处理流程
//! - 代码转换：持仓 (市场, 代码) -> 新浪查询代码，跨基金去重
//! - 批次划分：按板块每 80 个代码一批
//! - 行情请求：各批次并发请求，3 秒超时，不重试
//! - 行情解析：A股 / 港股 / 美股三种格式
//! - 估值汇总：按权重加权，按覆盖度修正
//! - 结果分类：A股 / 港股 / 美股标记，上涨 / 下跌 / 海外分组

#![allow(dead_code)]

mod aggregator;
mod batch;
mod classifier;
mod common;
mod engine;
mod fetcher;
mod parser;
mod symbol;

pub use common::*;
pub use engine::ValuationEngine;
pub use fetcher::{FetchError, QuoteSource, SinaQuoteSource};
pub use batch::QuoteBatch;
pub use symbol::normalize_us_code;
