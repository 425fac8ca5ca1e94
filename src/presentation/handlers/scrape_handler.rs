// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::application::dto::scrape_request::ScrapeRequestDto;
use crate::application::dto::scrape_response::ScrapeResponseDto;
use crate::application::usecases::run_scrape::RunScrapeUseCase;
use crate::domain::models::scrape_result::ScrapeStatus;
use crate::infrastructure::storage::ListingStore;
use crate::presentation::errors::AppError;
use crate::utils::validators;

/// 处理抓取请求
///
/// 同步运行一次作业并返回类型化结果。凭证缺失由编排器内的
/// 门卫处理并映射为401；结构性请求错误（URL无效、字段为空）
/// 在进入编排器之前被拒绝为400。
pub async fn create_scrape(
    Extension(use_case): Extension<Arc<RunScrapeUseCase>>,
    Extension(store): Extension<Arc<ListingStore>>,
    Json(payload): Json<ScrapeRequestDto>,
) -> Result<Response, AppError> {
    validators::validate_request(&payload)?;

    let result = use_case.execute(&payload).await;

    if result.status == ScrapeStatus::Success {
        // A failed write must not discard the result of a costly browser
        // automation cycle; the caller still gets the records.
        if let Err(e) = store.append(result.job_id, &result.records).await {
            warn!(job_id = %result.job_id, error = %e, "Could not persist scraped listings");
        }
    }

    let status_code = http_status(result.status);
    Ok((status_code, Json(ScrapeResponseDto::from_result(result))).into_response())
}

/// 把分类结果状态映射为HTTP状态码
fn http_status(status: ScrapeStatus) -> StatusCode {
    match status {
        ScrapeStatus::Success | ScrapeStatus::EmptyResult => StatusCode::OK,
        ScrapeStatus::AuthError => StatusCode::UNAUTHORIZED,
        ScrapeStatus::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ScrapeStatus::CrashError | ScrapeStatus::MalformedOutput => StatusCode::BAD_GATEWAY,
    }
}
