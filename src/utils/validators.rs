// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;
use url::Url;

use crate::application::dto::scrape_request::ScrapeRequestDto;

/// 调用层用来表示"未设置"的占位符字面量
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// 验证错误类型
#[derive(Error, Debug)]
pub enum ValidationError {
    /// URL无效
    #[error("Invalid target URL")]
    InvalidUrl,
    /// 缺少必填字段
    #[error("Field '{0}' cannot be empty")]
    MissingField(&'static str),
    /// 缺少AI API密钥
    #[error("Missing AI API key")]
    MissingApiKey,
}

/// 凭证门卫
///
/// 在启动任何子进程之前检查AI API密钥是否可用。
/// 密钥缺失、为空白或为占位符字面量时拒绝作业提交。
///
/// # 参数
///
/// * `api_key` - 请求携带的API密钥
///
/// # 返回值
///
/// * `Ok(())` - 密钥可用
/// * `Err(ValidationError::MissingApiKey)` - 密钥不可用
pub fn validate_api_key(api_key: &str) -> Result<(), ValidationError> {
    let trimmed = api_key.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER_API_KEY {
        return Err(ValidationError::MissingApiKey);
    }
    Ok(())
}

/// 验证目标URL
///
/// # 参数
///
/// * `url` - URL字符串
///
/// # 返回值
///
/// * `Ok(())` - URL有效
/// * `Err(ValidationError)` - URL无效
pub fn validate_target_url(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url).map_err(|_| ValidationError::InvalidUrl)?;

    // Check scheme
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(())
}

/// 验证抓取请求的结构完整性
///
/// 检查凭证之外的所有必填字段；凭证由 [`validate_api_key`]
/// 单独把关，以便编排器将其映射为 AuthError 而不是请求错误。
///
/// # 参数
///
/// * `request` - 抓取请求DTO
///
/// # 返回值
///
/// * `Ok(())` - 请求结构有效
/// * `Err(ValidationError)` - 请求结构无效
pub fn validate_request(request: &ScrapeRequestDto) -> Result<(), ValidationError> {
    if request.brand.trim().is_empty() {
        return Err(ValidationError::MissingField("brand"));
    }
    if request.model.trim().is_empty() {
        return Err(ValidationError::MissingField("model"));
    }
    validate_target_url(&request.url)
}
