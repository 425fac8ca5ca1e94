// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use std::fmt;

/// 抓取请求数据传输对象
///
/// 封装客户端发起的车辆市场搜索请求。启动子进程前所有字段
/// 都必须存在；api_key绝不写入日志或持久化。
#[derive(Clone, Deserialize)]
pub struct ScrapeRequestDto {
    /// 目标市场页面URL
    pub url: String,
    /// 品牌
    pub brand: String,
    /// 型号
    pub model: String,
    /// 年份
    pub year: i32,
    /// AI API密钥
    pub api_key: String,
}

// Manual Debug so request logging can never expose the api_key.
impl fmt::Debug for ScrapeRequestDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeRequestDto")
            .field("url", &self.url)
            .field("brand", &self.brand)
            .field("model", &self.model)
            .field("year", &self.year)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
