//! 估值接口处理器
//!
//! ## API 列表
//! - GET /funds - 持仓快照
//! - GET /valuations - 全部基金估值看板，可用 ?bucket=all|gainers|losers|overseas 只取一组
//! - GET /valuations/{fund_id} - 单只基金估值
//!
//! 每次请求都重新读取快照并完整计算一次

use actix_web::{web, HttpResponse, Result};

use crate::handlers::AppState;
use crate::models::{ApiResponse, Bucket, Fund, ValuationBoard, ValuationQuery, ValuationResult};
use crate::services::holdings::load_snapshot;

/// 读取持仓快照，失败时直接给出错误响应
fn load_funds(state: &AppState) -> std::result::Result<Vec<Fund>, HttpResponse> {
    load_snapshot(&state.holdings_path).map_err(|e| {
        log::warn!("{:#}", e);
        HttpResponse::NotFound().json(ApiResponse::<()>::error(format!("{:#}", e)))
    })
}

/// 获取持仓快照
///
/// GET /api/v1/funds
pub async fn list_funds(state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_funds(&state) {
        Ok(funds) => Ok(HttpResponse::Ok().json(ApiResponse::success(funds))),
        Err(response) => Ok(response),
    }
}

/// 获取估值看板
///
/// GET /api/v1/valuations?bucket=gainers
pub async fn get_valuations(
    state: web::Data<AppState>,
    query: web::Query<ValuationQuery>,
) -> Result<HttpResponse> {
    let bucket = match query.bucket.as_deref().map(str::parse::<Bucket>).transpose() {
        Ok(bucket) => bucket,
        Err(e) => {
            let response = ApiResponse::<ValuationBoard>::error(e);
            return Ok(HttpResponse::BadRequest().json(response));
        }
    };

    let funds = match load_funds(&state) {
        Ok(funds) => funds,
        Err(response) => return Ok(response),
    };

    let board = state.engine.run_pass(&funds).await;
    match bucket {
        Some(bucket) => {
            let results = board.bucket(bucket).to_vec();
            Ok(HttpResponse::Ok().json(ApiResponse::success(results)))
        }
        None => Ok(HttpResponse::Ok().json(ApiResponse::success(board))),
    }
}

/// 获取单只基金估值
///
/// GET /api/v1/valuations/{fund_id}
pub async fn get_fund_valuation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let fund_id = path.into_inner();

    let funds = match load_funds(&state) {
        Ok(funds) => funds,
        Err(response) => return Ok(response),
    };

    let Some(fund) = funds.into_iter().find(|f| f.id == fund_id) else {
        let response = ApiResponse::<ValuationResult>::error(format!("未找到基金 {}", fund_id));
        return Ok(HttpResponse::NotFound().json(response));
    };

    let board = state.engine.run_pass(std::slice::from_ref(&fund)).await;
    match board.all.into_iter().next() {
        Some(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        None => {
            let response = ApiResponse::<ValuationResult>::error("估值计算无结果".to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/funds", web::get().to(list_funds)).service(
        web::scope("/valuations")
            .route("", web::get().to(get_valuations))
            .route("/{fund_id}", web::get().to(get_fund_valuation)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuoteConfig, ValuationConfig};
    use crate::services::valuation::{FetchError, QuoteBatch, QuoteSource, ValuationEngine};
    use actix_web::{http::StatusCode, test, App};
    use futures::future::BoxFuture;
    use serde_json::Value;
    use std::path::PathBuf;

    /// A 股统一上涨 2%，其它板块请求失败
    struct FixedSource;

    impl QuoteSource for FixedSource {
        fn fetch<'a>(&'a self, batch: &'a QuoteBatch) -> BoxFuture<'a, std::result::Result<String, FetchError>> {
            Box::pin(async move {
                if batch.feed != crate::models::QuoteFeed::AShare {
                    return Err(FetchError::Status(403));
                }
                Ok(batch
                    .symbols
                    .iter()
                    .map(|s| format!("var hq_str_{}=\"名称,10.00,50.00,51.00\";", s))
                    .collect::<Vec<_>>()
                    .join("\n"))
            })
        }
    }

    fn write_snapshot(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fund-valuation-{}-{}.json",
            name,
            std::process::id()
        ));
        let content = r#"{
            "005827": {
                "name": "易方达蓝筹精选",
                "source": "网络爬虫 (005827)",
                "holdings": [
                    {"code": "600519", "name": "贵州茅台", "market": "sh", "weight": 30.0},
                    {"code": "000858", "name": "五粮液", "market": "sz", "weight": 30.0},
                    {"code": "00700", "name": "腾讯控股", "market": "hk", "weight": 10.0}
                ]
            },
            "161125": {
                "name": "标普500",
                "source": "手动兜底",
                "holdings": [
                    {"code": "AAPL", "name": "苹果", "market": "us", "weight": 8.0}
                ]
            }
        }"#;
        std::fs::write(&path, content).unwrap();
        path
    }

    fn state(holdings_path: PathBuf) -> web::Data<AppState> {
        web::Data::new(AppState {
            engine: ValuationEngine::new(
                Box::new(FixedSource),
                QuoteConfig::default(),
                ValuationConfig::default(),
            ),
            holdings_path,
        })
    }

    #[actix_web::test]
    async fn test_get_valuations() {
        let path = write_snapshot("board");
        let app = test::init_service(
            App::new()
                .app_data(state(path.clone()))
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/valuations").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        std::fs::remove_file(&path).ok();

        assert_eq!(body["success"], true);
        let all = body["data"]["all"].as_array().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["fund_id"], "005827");
        assert_eq!(all[0]["tag"], "overseas_hk");
        // 权重 70：1.2 / 70 * 100 * 0.95
        let estimate = all[0]["estimated_percent_change"].as_f64().unwrap();
        assert!((estimate - 1.2 / 70.0 * 100.0 * 0.95).abs() < 1e-9);
        assert_eq!(all[1]["estimated_percent_change"].as_f64().unwrap(), 0.0);
        assert_eq!(body["data"]["stats"]["failed_batches"], 2);
    }

    #[actix_web::test]
    async fn test_get_valuations_bucket() {
        let path = write_snapshot("bucket");
        let app = test::init_service(
            App::new()
                .app_data(state(path.clone()))
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/valuations?bucket=gainers")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/v1/valuations?bucket=nope")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        std::fs::remove_file(&path).ok();
    }

    #[actix_web::test]
    async fn test_get_fund_valuation() {
        let path = write_snapshot("single");
        let app = test::init_service(
            App::new()
                .app_data(state(path.clone()))
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/valuations/161125")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["tag"], "overseas_us");
        assert_eq!(body["data"]["provenance"], "manual");
        assert_eq!(body["data"]["holdings"][0]["quality"], "missing");

        let req = test::TestRequest::get()
            .uri("/api/v1/valuations/999999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        std::fs::remove_file(&path).ok();
    }

    #[actix_web::test]
    async fn test_missing_snapshot() {
        let app = test::init_service(
            App::new()
                .app_data(state(PathBuf::from("/nonexistent/holdings.json")))
                .configure(crate::handlers::config),
        )
        .await;

        for uri in ["/api/v1/funds", "/api/v1/valuations"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
