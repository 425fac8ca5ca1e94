// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::usecases::run_scrape::RunScrapeUseCase;
use crate::infrastructure::storage::ListingStore;
use crate::presentation::handlers::scrape_handler;

/// 创建应用路由
///
/// # 参数
///
/// * `use_case` - 抓取作业编排器
/// * `store` - 本地列表存储
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(use_case: Arc<RunScrapeUseCase>, store: Arc<ListingStore>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/v1/scrape", post(scrape_handler::create_scrape))
        .layer(Extension(use_case))
        .layer(Extension(store))
        // Local dashboard runs on a different port in dev.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回`{"status":"ok"}`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
