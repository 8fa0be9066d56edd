//! 业务逻辑服务模块
//!
//! 封装数据获取和处理逻辑

pub mod holdings;   // 持仓快照
pub mod valuation;  // 实时估值
