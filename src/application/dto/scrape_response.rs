// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::scrape_result::{ScrapeResult, ScrapeStatus};
use crate::domain::models::vehicle::VehicleRecord;

/// 结果统计
#[derive(Debug, Serialize)]
pub struct ListingStats {
    /// 本次作业的记录数
    pub count: usize,
    /// 本次作业记录的平均价格（无记录时为None）
    pub average_price: Option<f64>,
}

impl ListingStats {
    /// 基于单次作业的记录计算统计
    pub fn from_records(records: &[VehicleRecord]) -> Self {
        let count = records.len();
        let average_price = if count == 0 {
            None
        } else {
            Some(records.iter().map(|r| r.price).sum::<f64>() / count as f64)
        };
        Self {
            count,
            average_price,
        }
    }
}

/// 抓取响应数据传输对象
///
/// 调用方收到的是类型化结果，绝不是原始子进程文本或堆栈信息。
#[derive(Debug, Serialize)]
pub struct ScrapeResponseDto {
    /// 作业唯一标识符
    pub id: Uuid,
    /// 分类结果状态
    pub status: ScrapeStatus,
    /// 归一化后的车辆记录
    pub data: Vec<VehicleRecord>,
    /// 结果统计
    pub stats: ListingStats,
    /// 面向调用方的简短说明
    pub message: String,
}

impl ScrapeResponseDto {
    /// 由编排器结果构造响应
    pub fn from_result(result: ScrapeResult) -> Self {
        let message = match result.status {
            ScrapeStatus::Success => "Scraping completed successfully".to_string(),
            ScrapeStatus::EmptyResult => "No cars found".to_string(),
            ScrapeStatus::Timeout => "Scrape job exceeded its deadline".to_string(),
            ScrapeStatus::AuthError => "Missing AI API key".to_string(),
            ScrapeStatus::CrashError => "Automation subprocess failed".to_string(),
            ScrapeStatus::MalformedOutput => {
                "Automation subprocess produced no usable output".to_string()
            }
        };
        let stats = ListingStats::from_records(&result.records);
        Self {
            id: result.job_id,
            status: result.status,
            data: result.records,
            stats,
            message,
        }
    }
}
