use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::ApiResponse;

/// GET /api/v1/health
pub async fn health_check() -> Result<HttpResponse> {
    let response = ApiResponse::with_message(
        json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
        "Service is healthy".to_string(),
    );
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
