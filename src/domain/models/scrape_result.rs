// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::vehicle::VehicleRecord;

/// 抓取作业的分类结果状态
///
/// 编排器把子进程的每一条终止路径都归入这些状态之一，
/// 从不让原始故障向调用方传播。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    /// 提取成功且至少有一条归一化记录
    Success,
    /// 交接文件格式正确但没有记录（有效的终止状态，不是错误）
    EmptyResult,
    /// 子进程超过截止时间被强制终止
    Timeout,
    /// 凭证缺失，在启动子进程之前被拒绝
    AuthError,
    /// 子进程非零退出
    CrashError,
    /// 零退出但交接契约未被履行（缺少成功标记或文件无效）
    MalformedOutput,
}

impl ScrapeStatus {
    /// 该状态是否为有效的成功终止（包括空结果）
    pub fn is_ok(&self) -> bool {
        matches!(self, ScrapeStatus::Success | ScrapeStatus::EmptyResult)
    }
}

/// 抓取作业结果
///
/// 记录顺序即提取顺序，顺序本身不承载语义。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// 作业唯一标识符，同时用作日志关联键
    pub job_id: Uuid,
    /// 归一化后的车辆记录
    pub records: Vec<VehicleRecord>,
    /// 分类结果状态
    pub status: ScrapeStatus,
}

impl ScrapeResult {
    /// 创建一个不携带记录的分类结果
    pub fn classified(job_id: Uuid, status: ScrapeStatus) -> Self {
        Self {
            job_id,
            records: Vec::new(),
            status,
        }
    }

    /// 创建一个成功结果
    pub fn success(job_id: Uuid, records: Vec<VehicleRecord>) -> Self {
        let status = if records.is_empty() {
            ScrapeStatus::EmptyResult
        } else {
            ScrapeStatus::Success
        };
        Self {
            job_id,
            records,
            status,
        }
    }
}
