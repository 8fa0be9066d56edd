pub mod health;
pub mod valuation;

use actix_web::web;
use std::path::PathBuf;

use crate::services::valuation::ValuationEngine;

/// 处理器共享状态
pub struct AppState {
    /// 估值引擎
    pub engine: ValuationEngine,
    /// 持仓快照路径，每次请求重新读取
    pub holdings_path: PathBuf,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(valuation::config)
    );
}
