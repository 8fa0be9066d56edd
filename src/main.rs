//! 基金实时估值服务
//!
//! 根据基金披露的重仓股和新浪财经实时行情估算基金当日涨跌幅，
//! 覆盖沪深、北交所、港股、美股四类持仓

mod config;     // 配置
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::middleware::ApiKeyMiddleware;
use crate::services::valuation::{SinaQuoteSource, ValuationEngine};

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (config, warnings) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    match &config.loaded_from {
        Some(path) => log::info!("从 {} 加载配置成功", path.display()),
        None => log::info!("使用默认配置"),
    }
    if config.api.api_key.is_empty() {
        log::warn!("未设置 API Key，接口认证已关闭");
    }

    let source = SinaQuoteSource::new(&config.quote).context("创建行情客户端失败")?;
    let state = web::Data::new(AppState {
        engine: ValuationEngine::new(
            Box::new(source),
            config.quote.clone(),
            config.valuation.clone(),
        ),
        holdings_path: PathBuf::from(&config.data.holdings_path),
    });

    let bind_addr = config.bind_addr();
    log::info!("启动基金估值服务，监听 {}", bind_addr);

    let api_key = config.api.api_key.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(ApiKeyMiddleware::new(&api_key)) // API Key 认证
            .wrap(Logger::default()) // 请求日志
            .app_data(state.clone())
            .configure(handlers::config) // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_addr)
        .with_context(|| format!("绑定地址 {} 失败", bind_addr))?
        .run()
        .await?;

    Ok(())
}
